//! Small descriptive-statistics helpers shared by the ratio calculations.

use crate::error::AnalyticsError;

/// Rejects annualization factors that are not finite and strictly positive.
pub(crate) fn validate_periods_per_year(periods_per_year: f64) -> Result<(), AnalyticsError> {
    if periods_per_year.is_finite() && periods_per_year > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::invalid(format!(
            "periods_per_year must be a positive number, got {periods_per_year}"
        )))
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`).
///
/// Values that are all bitwise equal have a deviation of exactly zero, even when the mean
/// does not round back to that value.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    std_dev(values, 0)
}

/// Sample standard deviation (divisor `n - 1`); zero for fewer than two values.
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    std_dev(values, 1)
}

fn std_dev(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof || all_equal(values) {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq = values
        .iter()
        .map(|x| {
            let d = x - m;
            d * d
        })
        .sum::<f64>();
    (sum_sq / (values.len() - ddof) as f64).sqrt()
}

fn all_equal(values: &[f64]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}
