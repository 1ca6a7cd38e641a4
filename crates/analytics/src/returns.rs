use crate::error::AnalyticsError;
use core_types::{CumulativeReturnsSeries, EquityCurve, ReturnsSeries};

/// Computes simple period returns from an equity curve.
///
/// The output has the same length and index as the curve. The first return is `0.0` because
/// there is no prior observation to compare against.
///
/// # Errors
///
/// `InvalidInput` if the curve is empty, or if any value that acts as a divisor is not
/// positive. With two or more points that includes the first value.
pub fn compute_returns(curve: &EquityCurve) -> Result<ReturnsSeries, AnalyticsError> {
    let values = curve.values();

    if values.is_empty() {
        return Err(AnalyticsError::invalid(
            "cannot compute returns of an empty equity curve",
        ));
    }

    if values.len() > 1 {
        if let Some((position, (timestamp, equity))) = curve
            .timestamps()
            .iter()
            .zip(values)
            .enumerate()
            .find(|(_, (_, equity))| **equity <= 0.0)
        {
            return Err(AnalyticsError::invalid(format!(
                "equity must be positive to compute returns, got {equity} at point {position} ({timestamp})"
            )));
        }
    }

    let mut returns = Vec::with_capacity(values.len());
    returns.push(0.0);
    returns.extend(values.windows(2).map(|w| w[1] / w[0] - 1.0));

    Ok(ReturnsSeries::new(curve.index().clone(), returns)?)
}

/// Compounds returns into growth factors in the log domain.
///
/// Each factor is `exp(sum(ln(1 + r)))` over all returns up to and including that point, which
/// bounds the drift that naive repeated multiplication accumulates over long series.
///
/// # Errors
///
/// `InvalidInput` if any return is not finite or is `<= -1` (a total loss or worse), since the
/// logarithm is undefined there.
pub fn compute_cumulative(
    returns: &ReturnsSeries,
) -> Result<CumulativeReturnsSeries, AnalyticsError> {
    let mut log_sum = 0.0_f64;
    let mut cumulative = Vec::with_capacity(returns.len());

    for (timestamp, value) in returns.iter() {
        log_sum += log_growth(value).map_err(|e| at_timestamp(e, timestamp))?;
        cumulative.push(log_sum.exp());
    }

    Ok(CumulativeReturnsSeries::new(
        returns.index().clone(),
        cumulative,
    )?)
}

/// Compounds a group of returns into a single period return, `prod(1 + r) - 1`, using the
/// same log-domain accumulation as [`compute_cumulative`].
pub(crate) fn compound_returns<I>(returns: I) -> Result<f64, AnalyticsError>
where
    I: IntoIterator<Item = f64>,
{
    let log_sum = returns
        .into_iter()
        .map(log_growth)
        .sum::<Result<f64, _>>()?;
    Ok(log_sum.exp() - 1.0)
}

/// `ln(1 + r)` for a single period return.
pub(crate) fn log_growth(value: f64) -> Result<f64, AnalyticsError> {
    if !value.is_finite() {
        return Err(AnalyticsError::invalid(format!(
            "period return {value} is not finite"
        )));
    }
    if value <= -1.0 {
        return Err(AnalyticsError::invalid(format!(
            "period return {value} is a loss of 100% or more; growth is undefined"
        )));
    }
    Ok(value.ln_1p())
}

fn at_timestamp(error: AnalyticsError, timestamp: chrono::DateTime<chrono::Utc>) -> AnalyticsError {
    match error {
        AnalyticsError::InvalidInput(reason) => {
            AnalyticsError::InvalidInput(format!("{reason} (at {timestamp})"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use core_types::EquityPoint;
    use std::sync::Arc;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn curve(values: &[f64]) -> EquityCurve {
        EquityCurve::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| EquityPoint::new(day(i as i64), *v))
                .collect(),
        )
        .unwrap()
    }

    fn returns(values: &[f64]) -> ReturnsSeries {
        let index = (0..values.len()).map(|i| day(i as i64)).collect();
        ReturnsSeries::new(index, values.to_vec()).unwrap()
    }

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() <= tolerance, "index {i}: {a} != {e}");
        }
    }

    #[test]
    fn returns_of_reference_curve() {
        let equity = curve(&[100.0, 110.0, 99.0, 121.0]);
        let result = compute_returns(&equity).unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.values()[0], 0.0);
        assert_close(result.values(), &[0.0, 0.10, -0.10, 22.0 / 99.0], 1e-12);
        assert!(Arc::ptr_eq(result.index(), equity.index()));
    }

    #[test]
    fn returns_of_single_point_curve() {
        struct TestCase {
            value: f64,
        }

        // The only value is never used as a divisor, so its sign does not matter.
        let cases = vec![TestCase { value: 100.0 }, TestCase { value: 0.0 }];

        for (index, test) in cases.into_iter().enumerate() {
            let result = compute_returns(&curve(&[test.value])).unwrap();
            assert_eq!(result.values(), &[0.0], "TC{index} failed");
        }
    }

    #[test]
    fn returns_reject_invalid_curves() {
        struct TestCase {
            values: Vec<f64>,
        }

        let cases = vec![
            // TC0: empty curve
            TestCase { values: vec![] },
            // TC1: zero after the first point
            TestCase {
                values: vec![100.0, 0.0, 50.0],
            },
            // TC2: negative equity
            TestCase {
                values: vec![100.0, 90.0, -5.0],
            },
            // TC3: zero first value used as divisor
            TestCase {
                values: vec![0.0, 10.0],
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let result = compute_returns(&curve(&test.values));
            assert!(
                matches!(result, Err(AnalyticsError::InvalidInput(_))),
                "TC{index} failed"
            );
        }
    }

    #[test]
    fn cumulative_of_reference_curve() {
        let returns = compute_returns(&curve(&[100.0, 110.0, 99.0, 121.0])).unwrap();
        let result = compute_cumulative(&returns).unwrap();

        assert_eq!(result.values()[0], 1.0);
        assert_close(result.values(), &[1.0, 1.10, 0.99, 1.21], 1e-12);
    }

    #[test]
    fn cumulative_matches_iterative_multiplication() {
        // A long, noisy, deterministic series.
        let values: Vec<f64> = (0..5_000)
            .map(|i| {
                let x = i as f64;
                0.01 * (x * 0.7).sin() + 0.003 * (x * 1.3).cos()
            })
            .collect();
        let series = returns(&values);

        let log_domain = compute_cumulative(&series).unwrap();

        let mut product = 1.0_f64;
        for (i, r) in values.iter().enumerate() {
            product *= 1.0 + r;
            let relative = (log_domain.values()[i] - product).abs() / product;
            assert!(relative < 1e-9, "index {i}: relative error {relative}");
        }
    }

    #[test]
    fn cumulative_reconstructs_equity() {
        let values = [250.0, 251.25, 248.0, 260.5, 259.9, 275.0, 240.0];
        let equity = curve(&values);
        let cumulative = compute_cumulative(&compute_returns(&equity).unwrap()).unwrap();

        for (i, (growth, original)) in cumulative.values().iter().zip(values).enumerate() {
            let rebuilt = growth * values[0];
            let relative = (rebuilt - original).abs() / original;
            assert!(relative < 1e-9, "index {i}: {rebuilt} vs {original}");
        }
    }

    #[test]
    fn cumulative_rejects_total_loss() {
        struct TestCase {
            values: Vec<f64>,
        }

        let cases = vec![
            // TC0: exactly -100%
            TestCase {
                values: vec![0.0, 0.1, -1.0],
            },
            // TC1: worse than -100%
            TestCase {
                values: vec![0.0, -1.5],
            },
            // TC2: NaN return
            TestCase {
                values: vec![0.0, f64::NAN],
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let result = compute_cumulative(&returns(&test.values));
            assert!(
                matches!(result, Err(AnalyticsError::InvalidInput(_))),
                "TC{index} failed"
            );
        }
    }

    #[test]
    fn compound_returns_of_group() {
        let result = compound_returns([0.1, -0.1, 0.05]).unwrap();
        assert!((result - (1.1 * 0.9 * 1.05 - 1.0)).abs() < 1e-12);

        assert_eq!(compound_returns(std::iter::empty()).unwrap(), 0.0);
        assert!(compound_returns([0.2, -1.0]).is_err());
    }
}
