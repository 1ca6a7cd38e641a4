use crate::error::AnalyticsError;
use core_types::{CumulativeReturnsSeries, DrawdownSeries};
use std::ops::RangeInclusive;

/// The drawdown curve of a cumulative returns series and its headline figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawdowns {
    pub series: DrawdownSeries,
    /// Largest value in `series`, `0.0` if the series never declines.
    pub max_drawdown: f64,
    /// Length, in observations, of the longest run with drawdown strictly above zero.
    pub max_drawdown_duration: usize,
    /// Positions of the run measured by `max_drawdown_duration`. The first run wins a tie.
    pub longest_run: Option<RangeInclusive<usize>>,
}

/// Computes the fractional decline from the running peak at every point.
///
/// `drawdown[t] = 1 - cum[t] / max(cum[0..=t])`. The peak is a monotonic watermark, so
/// drawdown is exactly zero whenever a new high (or a tie with the old one) is made.
///
/// # Errors
///
/// `InvalidInput` if a growth factor is not finite or not positive.
pub fn compute_drawdowns(
    cumulative: &CumulativeReturnsSeries,
) -> Result<Drawdowns, AnalyticsError> {
    let mut values = Vec::with_capacity(cumulative.len());
    let mut peak = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0_f64;

    // (start, length) of the run in progress and of the longest run seen so far.
    let mut current: Option<(usize, usize)> = None;
    let mut longest: Option<(usize, usize)> = None;

    for (position, (timestamp, growth)) in cumulative.iter().enumerate() {
        if !growth.is_finite() || growth <= 0.0 {
            return Err(AnalyticsError::invalid(format!(
                "cumulative growth factor must be positive, got {growth} at {timestamp}"
            )));
        }

        peak = peak.max(growth);
        let drawdown = 1.0 - growth / peak;
        values.push(drawdown);

        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }

        if drawdown > 0.0 {
            let run = match current {
                Some((start, length)) => (start, length + 1),
                None => (position, 1),
            };
            current = Some(run);
            // Strictly longer only, so an equal run later on never replaces the first.
            if longest.is_none_or(|(_, best)| run.1 > best) {
                longest = Some(run);
            }
        } else {
            current = None;
        }
    }

    let series = DrawdownSeries::new(cumulative.index().clone(), values)?;

    Ok(Drawdowns {
        series,
        max_drawdown,
        max_drawdown_duration: longest.map_or(0, |(_, length)| length),
        longest_run: longest.map(|(start, length)| start..=start + length - 1),
    })
}
