//! # Tearsheet Analytics Engine
//!
//! This crate turns an equity curve into the return-based statistics a performance report
//! is made of: period returns, compounded growth, drawdowns, annualized ratios and calendar
//! aggregates.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files, terminals or
//!   plotting. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function is a pure transformation of its input. The
//!   caller's `EquityCurve` is never mutated, so bundles for many curves can be built on as
//!   many threads as the caller likes.
//! - **Fail Fast:** Malformed input is reported as `AnalyticsError::InvalidInput`. Degenerate
//!   but valid input (zero volatility, no losing periods, no net change) yields `0.0`.
//!
//! ## Public API
//!
//! - `StatisticsBundle`: everything derived from one curve; the contract for report renderers.
//! - `Comparison`: independent bundles for a list of strategies and an optional benchmark.
//! - The individual computations (`compute_returns`, `compute_drawdowns`, ...) for callers
//!   that need a single figure.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod bundle;
pub mod comparison;
pub mod drawdown;
pub mod error;
pub mod ratios;
pub mod returns;
mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{PeriodAggregate, aggregate_returns};
pub use bundle::{DrawdownPeriod, Metric, ScalarStatistics, StatisticsBundle};
pub use comparison::{Comparison, ComparisonEntry, CurveInput, default_label};
pub use drawdown::{Drawdowns, compute_drawdowns};
pub use error::AnalyticsError;
pub use ratios::{
    compute_annual_volatility, compute_cagr, compute_sharpe_ratio, compute_sortino_ratio,
    compute_total_return,
};
pub use returns::{compute_cumulative, compute_returns};
