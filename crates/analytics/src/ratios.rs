//! Annualized risk/return ratios.
//!
//! Degenerate but valid inputs (no variance, no losing periods, no net change) resolve to
//! `0.0` instead of an infinity or NaN so every consumer can format the result. Malformed
//! inputs are reported as [`AnalyticsError::InvalidInput`].

use crate::error::AnalyticsError;
use crate::stats::{mean, population_std_dev, sample_std_dev, validate_periods_per_year};
use core_types::{CumulativeReturnsSeries, ReturnsSeries};

/// `mean(returns) / stddev(returns) * sqrt(periods_per_year)`, with a zero risk-free rate.
///
/// Returns `0.0` when the standard deviation is zero.
pub fn compute_sharpe_ratio(
    returns: &ReturnsSeries,
    periods_per_year: f64,
) -> Result<f64, AnalyticsError> {
    validate_periods_per_year(periods_per_year)?;
    let values = non_empty(returns, "Sharpe ratio")?;

    let std_dev = population_std_dev(values);
    if std_dev == 0.0 {
        tracing::debug!("Returns have zero volatility; Sharpe ratio defined as 0.0");
        return Ok(0.0);
    }

    Ok(mean(values) / std_dev * periods_per_year.sqrt())
}

/// Like [`compute_sharpe_ratio`] with the standard deviation of the strictly negative returns
/// as the denominator.
///
/// Returns `0.0` when there are no negative returns or their deviation is zero.
pub fn compute_sortino_ratio(
    returns: &ReturnsSeries,
    periods_per_year: f64,
) -> Result<f64, AnalyticsError> {
    validate_periods_per_year(periods_per_year)?;
    let values = non_empty(returns, "Sortino ratio")?;

    let downside: Vec<f64> = values.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_deviation = population_std_dev(&downside);
    if downside_deviation == 0.0 {
        tracing::debug!(
            negative_periods = downside.len(),
            "No downside deviation; Sortino ratio defined as 0.0"
        );
        return Ok(0.0);
    }

    Ok(mean(values) / downside_deviation * periods_per_year.sqrt())
}

/// Compound annual growth rate: `cum[last] ^ (periods_per_year / n) - 1`.
///
/// Returns exactly `0.0` when the final growth factor is exactly `1.0`.
pub fn compute_cagr(
    cumulative: &CumulativeReturnsSeries,
    periods_per_year: f64,
) -> Result<f64, AnalyticsError> {
    validate_periods_per_year(periods_per_year)?;
    let final_growth = last_growth(cumulative, "CAGR")?;

    if final_growth == 1.0 {
        return Ok(0.0);
    }

    let observations = cumulative.len() as f64;
    Ok(final_growth.powf(periods_per_year / observations) - 1.0)
}

/// Annualized volatility: the sample standard deviation of returns times
/// `sqrt(periods_per_year)`.
pub fn compute_annual_volatility(
    returns: &ReturnsSeries,
    periods_per_year: f64,
) -> Result<f64, AnalyticsError> {
    validate_periods_per_year(periods_per_year)?;
    let values = non_empty(returns, "annual volatility")?;

    Ok(sample_std_dev(values) * periods_per_year.sqrt())
}

/// Total return over the whole series, `cum[last] - 1`.
pub fn compute_total_return(cumulative: &CumulativeReturnsSeries) -> Result<f64, AnalyticsError> {
    Ok(last_growth(cumulative, "total return")? - 1.0)
}

fn non_empty<'a>(returns: &'a ReturnsSeries, metric: &str) -> Result<&'a [f64], AnalyticsError> {
    if returns.is_empty() {
        return Err(AnalyticsError::invalid(format!(
            "cannot compute {metric} of an empty returns series"
        )));
    }
    Ok(returns.values())
}

fn last_growth(cumulative: &CumulativeReturnsSeries, metric: &str) -> Result<f64, AnalyticsError> {
    let growth = cumulative.last().ok_or_else(|| {
        AnalyticsError::invalid(format!(
            "cannot compute {metric} of a series with no observations"
        ))
    })?;

    if !growth.is_finite() || growth <= 0.0 {
        return Err(AnalyticsError::invalid(format!(
            "final growth factor must be positive to compute {metric}, got {growth}"
        )));
    }
    Ok(growth)
}
