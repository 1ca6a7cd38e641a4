use crate::error::CoreError;
use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::sync::Arc;

/// A sequence of `f64` values aligned to a shared timestamp index.
///
/// The index is reference counted so that every series derived from one equity curve points at
/// the very same timestamps. Derived series never copy or alter the index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    index: Arc<[DateTime<Utc>]>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Pairs an index with a vector of values of the same length.
    pub fn new(index: Arc<[DateTime<Utc>]>, values: Vec<f64>) -> Result<Self, CoreError> {
        if index.len() != values.len() {
            return Err(CoreError::LengthMismatch {
                index: index.len(),
                values: values.len(),
            });
        }
        Ok(Self { index, values })
    }

    pub fn index(&self) -> &Arc<[DateTime<Utc>]> {
        &self.index
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Iterates `(timestamp, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// True when both series are aligned to the same shared index allocation.
    pub fn shares_index_with(&self, other: &TimeSeries) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }
}

/// Declares a typed wrapper around [`TimeSeries`] so different derived series cannot be mixed
/// up at call sites.
macro_rules! derived_series {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(TimeSeries);

        impl $name {
            pub fn new(index: Arc<[DateTime<Utc>]>, values: Vec<f64>) -> Result<Self, CoreError> {
                TimeSeries::new(index, values).map(Self)
            }
        }

        impl Deref for $name {
            type Target = TimeSeries;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

derived_series!(
    /// Simple period returns; the first value is always `0.0`.
    ReturnsSeries
);

derived_series!(
    /// Compounded growth factors; the first value is always `1.0`.
    CumulativeReturnsSeries
);

derived_series!(
    /// Fractional decline from the running peak of a cumulative series, always `>= 0`.
    DrawdownSeries
);
