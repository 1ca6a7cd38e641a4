use crate::error::AnalyticsError;
use crate::returns::compound_returns;
use core_types::{Granularity, Period, ReturnsSeries};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Compounded returns keyed by calendar period, in chronological order.
///
/// Only periods that contain at least one observation are present; the map is never
/// zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    pub granularity: Granularity,
    #[serde(serialize_with = "serialize_entries")]
    returns: BTreeMap<Period, f64>,
}

impl PeriodAggregate {
    pub fn get(&self, period: &Period) -> Option<f64> {
        self.returns.get(period).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.returns.iter().map(|(period, value)| (*period, *value))
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// The distinct calendar years covered, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.returns.keys().map(Period::year).collect();
        years.dedup();
        years
    }
}

/// Groups returns by calendar month or year and compounds each group independently,
/// `prod(1 + r) - 1`, in the log domain.
///
/// # Errors
///
/// `InvalidInput` if any return is not finite or is `<= -1`.
pub fn aggregate_returns(
    returns: &ReturnsSeries,
    granularity: Granularity,
) -> Result<PeriodAggregate, AnalyticsError> {
    let mut groups: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    for (timestamp, value) in returns.iter() {
        groups
            .entry(granularity.period_of(&timestamp))
            .or_default()
            .push(value);
    }

    let returns = groups
        .into_iter()
        .map(|(period, values)| Ok((period, compound_returns(values)?)))
        .collect::<Result<BTreeMap<_, _>, AnalyticsError>>()?;

    Ok(PeriodAggregate {
        granularity,
        returns,
    })
}

fn serialize_entries<S>(entries: &BTreeMap<Period, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Entry {
        period: String,
        #[serde(rename = "return")]
        value: f64,
    }

    serializer.collect_seq(entries.iter().map(|(period, value)| Entry {
        period: period.to_string(),
        value: *value,
    }))
}
