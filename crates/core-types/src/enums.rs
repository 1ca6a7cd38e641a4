use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The calendar bucket size used when re-compounding returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Yearly,
}

impl Granularity {
    /// Returns the calendar period a timestamp falls into at this granularity.
    pub fn period_of(&self, timestamp: &DateTime<Utc>) -> Period {
        match self {
            Granularity::Monthly => Period::Month {
                year: timestamp.year(),
                month: timestamp.month(),
            },
            Granularity::Yearly => Period::Year(timestamp.year()),
        }
    }
}

/// A calendar period key.
///
/// The derived `Ord` is chronological for keys of the same granularity, which is the only
/// way they are ever mixed (one `PeriodAggregate` holds a single granularity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn year(&self) -> i32 {
        match self {
            Period::Year(year) => *year,
            Period::Month { year, .. } => *year,
        }
    }

    /// The 1-based month, or `None` for a yearly key.
    pub fn month(&self) -> Option<u32> {
        match self {
            Period::Year(_) => None,
            Period::Month { month, .. } => Some(*month),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year(year) => write!(f, "{year}"),
            Period::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}
