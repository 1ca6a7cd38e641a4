use crate::error::CoreError;
use crate::series::TimeSeries;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A single observation of total portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: f64) -> Self {
        Self { timestamp, equity }
    }
}

/// An ordered, read-only series of portfolio equity values.
///
/// Construction validates the shape of the data (strictly increasing timestamps, finite
/// values). Whether the values make sense for return computation (non-empty, positive) is
/// decided by the analytics engine, which reports it as invalid input.
///
/// The curve's index is the one every derived series shares.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityCurve(TimeSeries);

impl EquityCurve {
    pub fn new(points: Vec<EquityPoint>) -> Result<Self, CoreError> {
        for (position, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(CoreError::InvalidInput(
                    "equity curve".to_string(),
                    format!(
                        "timestamps must be strictly increasing, but point {} ({}) does not follow point {} ({})",
                        position + 1,
                        pair[1].timestamp,
                        position,
                        pair[0].timestamp
                    ),
                ));
            }
        }

        if let Some((position, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.equity.is_finite())
        {
            return Err(CoreError::InvalidInput(
                "equity curve".to_string(),
                format!("equity at point {position} ({}) is not finite", point.timestamp),
            ));
        }

        let (index, values): (Vec<_>, Vec<_>) =
            points.into_iter().map(|p| (p.timestamp, p.equity)).unzip();

        Ok(Self(TimeSeries::new(index.into(), values)?))
    }

    /// Builds a curve from the `(timestamp, Decimal)` pairs produced by Decimal-based
    /// portfolio accounting.
    pub fn from_decimal(points: &[(DateTime<Utc>, Decimal)]) -> Result<Self, CoreError> {
        let converted = points
            .iter()
            .map(|(timestamp, equity)| {
                equity
                    .to_f64()
                    .map(|value| EquityPoint::new(*timestamp, value))
                    .ok_or_else(|| {
                        CoreError::InvalidInput(
                            "equity curve".to_string(),
                            format!("equity {equity} at {timestamp} is not representable as f64"),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(converted)
    }
}

impl Deref for EquityCurve {
    type Target = TimeSeries;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn new_accepts_ordered_points() {
        let curve = EquityCurve::new(vec![
            EquityPoint::new(day(0), 100.0),
            EquityPoint::new(day(1), 101.5),
        ])
        .unwrap();

        assert_eq!(curve.len(), 2);
        assert_eq!(curve.values(), &[100.0, 101.5]);
        assert_eq!(curve.timestamps(), &[day(0), day(1)]);
    }

    #[test]
    fn new_accepts_empty_curve() {
        let curve = EquityCurve::new(vec![]).unwrap();
        assert!(curve.is_empty());
    }

    #[test]
    fn new_rejects_bad_shapes() {
        struct TestCase {
            points: Vec<EquityPoint>,
        }

        let cases = vec![
            // TC0: duplicate timestamp
            TestCase {
                points: vec![EquityPoint::new(day(0), 1.0), EquityPoint::new(day(0), 1.0)],
            },
            // TC1: out of order
            TestCase {
                points: vec![EquityPoint::new(day(2), 1.0), EquityPoint::new(day(1), 1.0)],
            },
            // TC2: NaN equity
            TestCase {
                points: vec![EquityPoint::new(day(0), f64::NAN)],
            },
            // TC3: infinite equity
            TestCase {
                points: vec![
                    EquityPoint::new(day(0), 1.0),
                    EquityPoint::new(day(1), f64::INFINITY),
                ],
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let result = EquityCurve::new(test.points);
            assert!(
                matches!(result, Err(CoreError::InvalidInput(_, _))),
                "TC{index} failed"
            );
        }
    }

    #[test]
    fn from_decimal_converts_values() {
        let curve =
            EquityCurve::from_decimal(&[(day(0), dec!(10000)), (day(1), dec!(10250.5))]).unwrap();

        assert_eq!(curve.values(), &[10000.0, 10250.5]);
    }

    #[test]
    fn iterates_points_in_order() {
        let curve = EquityCurve::new(vec![
            EquityPoint::new(day(0), 1.0),
            EquityPoint::new(day(3), 2.0),
        ])
        .unwrap();

        assert_eq!(
            curve.iter().collect::<Vec<_>>(),
            vec![(day(0), 1.0), (day(3), 2.0)]
        );
        assert_eq!(curve.last(), Some(2.0));
    }
}
