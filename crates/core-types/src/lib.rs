//! # Core Types
//!
//! Layer 0 value types shared by every crate in the workspace: the equity curve handed in by
//! the caller, the derived series produced by the analytics engine, and the calendar keys used
//! for period aggregation. This crate has no logic beyond boundary validation.

pub mod enums;
pub mod error;
pub mod series;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Granularity, Period};
pub use error::CoreError;
pub use series::{CumulativeReturnsSeries, DrawdownSeries, ReturnsSeries, TimeSeries};
pub use structs::{EquityCurve, EquityPoint};
