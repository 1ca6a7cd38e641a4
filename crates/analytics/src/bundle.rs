use crate::aggregate::{PeriodAggregate, aggregate_returns};
use crate::drawdown::compute_drawdowns;
use crate::error::AnalyticsError;
use crate::ratios::{
    compute_annual_volatility, compute_cagr, compute_sharpe_ratio, compute_sortino_ratio,
    compute_total_return,
};
use crate::returns::{compute_cumulative, compute_returns};
use crate::stats::validate_periods_per_year;
use chrono::{DateTime, Utc};
use core_types::{CumulativeReturnsSeries, DrawdownSeries, EquityCurve, Granularity, ReturnsSeries};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// First and last timestamp of the longest under-water run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawdownPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The scalar statistics of one equity curve, computed once when the bundle is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarStatistics {
    pub sharpe: f64,
    pub sortino: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    /// Observations in the longest run spent below a prior peak.
    pub max_drawdown_duration: usize,
    pub total_return: f64,
    pub annual_volatility: f64,
    pub max_drawdown_period: Option<DrawdownPeriod>,
}

impl ScalarStatistics {
    /// Looks a scalar up by its [`Metric`] key. The duration is returned as a float.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalReturn => self.total_return,
            Metric::Cagr => self.cagr,
            Metric::Sharpe => self.sharpe,
            Metric::Sortino => self.sortino,
            Metric::AnnualVolatility => self.annual_volatility,
            Metric::MaxDrawdown => self.max_drawdown,
            Metric::MaxDrawdownDuration => self.max_drawdown_duration as f64,
        }
    }
}

/// The named scalar metrics exposed to the reporting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalReturn,
    Cagr,
    Sharpe,
    Sortino,
    AnnualVolatility,
    MaxDrawdown,
    MaxDrawdownDuration,
}

impl Metric {
    /// All metrics in tearsheet display order.
    pub const ALL: [Metric; 7] = [
        Metric::TotalReturn,
        Metric::Cagr,
        Metric::Sharpe,
        Metric::Sortino,
        Metric::AnnualVolatility,
        Metric::MaxDrawdown,
        Metric::MaxDrawdownDuration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::TotalReturn => "total_return",
            Metric::Cagr => "cagr",
            Metric::Sharpe => "sharpe",
            Metric::Sortino => "sortino",
            Metric::AnnualVolatility => "annual_volatility",
            Metric::MaxDrawdown => "max_drawdown",
            Metric::MaxDrawdownDuration => "max_drawdown_duration",
        }
    }

    /// Human readable row label.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::TotalReturn => "Total Return",
            Metric::Cagr => "CAGR",
            Metric::Sharpe => "Sharpe Ratio",
            Metric::Sortino => "Sortino Ratio",
            Metric::AnnualVolatility => "Annual Volatility",
            Metric::MaxDrawdown => "Max Drawdown",
            Metric::MaxDrawdownDuration => "Max Drawdown Duration",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_return" => Ok(Metric::TotalReturn),
            "cagr" => Ok(Metric::Cagr),
            "sharpe" => Ok(Metric::Sharpe),
            "sortino" => Ok(Metric::Sortino),
            "annual_volatility" => Ok(Metric::AnnualVolatility),
            // Both names are used by report consumers for the same figure.
            "max_drawdown" | "max_drawdown_pct" => Ok(Metric::MaxDrawdown),
            "max_drawdown_duration" => Ok(Metric::MaxDrawdownDuration),
            other => Err(AnalyticsError::InvalidInput(format!("unknown metric '{other}'"))),
        }
    }
}

/// Every statistic derived from one equity curve.
///
/// A bundle is built once, is never mutated afterwards and owns copies of everything it
/// exposes. Period aggregates are computed on first request and cached for the lifetime of
/// the bundle; all other values are computed eagerly by [`StatisticsBundle::build`].
#[derive(Debug, Clone)]
pub struct StatisticsBundle {
    periods_per_year: f64,
    equity: EquityCurve,
    returns: ReturnsSeries,
    cum_returns: CumulativeReturnsSeries,
    drawdowns: DrawdownSeries,
    statistics: ScalarStatistics,
    monthly: OnceLock<Result<PeriodAggregate, AnalyticsError>>,
    yearly: OnceLock<Result<PeriodAggregate, AnalyticsError>>,
}

impl StatisticsBundle {
    /// Runs the full pipeline over a curve: returns, cumulative returns, drawdowns, then the
    /// scalar ratios.
    ///
    /// The caller's curve is only read; the bundle keeps its own copy.
    #[tracing::instrument(name = "build_statistics_bundle", skip_all, fields(points = curve.len()))]
    pub fn build(curve: &EquityCurve, periods_per_year: f64) -> Result<Self, AnalyticsError> {
        validate_periods_per_year(periods_per_year)?;

        let returns = compute_returns(curve)?;
        let cum_returns = compute_cumulative(&returns)?;
        let drawdowns = compute_drawdowns(&cum_returns)?;

        let max_drawdown_period = drawdowns.longest_run.as_ref().map(|run| DrawdownPeriod {
            start: curve.timestamps()[*run.start()],
            end: curve.timestamps()[*run.end()],
        });

        let statistics = ScalarStatistics {
            sharpe: compute_sharpe_ratio(&returns, periods_per_year)?,
            sortino: compute_sortino_ratio(&returns, periods_per_year)?,
            cagr: compute_cagr(&cum_returns, periods_per_year)?,
            max_drawdown: drawdowns.max_drawdown,
            max_drawdown_duration: drawdowns.max_drawdown_duration,
            total_return: compute_total_return(&cum_returns)?,
            annual_volatility: compute_annual_volatility(&returns, periods_per_year)?,
            max_drawdown_period,
        };

        tracing::debug!(
            sharpe = statistics.sharpe,
            max_drawdown = statistics.max_drawdown,
            total_return = statistics.total_return,
            "Statistics bundle built"
        );

        Ok(Self {
            periods_per_year,
            equity: curve.clone(),
            returns,
            cum_returns,
            drawdowns: drawdowns.series,
            statistics,
            monthly: OnceLock::new(),
            yearly: OnceLock::new(),
        })
    }

    pub fn periods_per_year(&self) -> f64 {
        self.periods_per_year
    }

    pub fn equity(&self) -> &EquityCurve {
        &self.equity
    }

    pub fn returns(&self) -> &ReturnsSeries {
        &self.returns
    }

    pub fn cum_returns(&self) -> &CumulativeReturnsSeries {
        &self.cum_returns
    }

    pub fn drawdowns(&self) -> &DrawdownSeries {
        &self.drawdowns
    }

    pub fn statistics(&self) -> &ScalarStatistics {
        &self.statistics
    }

    pub fn sharpe(&self) -> f64 {
        self.statistics.sharpe
    }

    pub fn sortino(&self) -> f64 {
        self.statistics.sortino
    }

    pub fn cagr(&self) -> f64 {
        self.statistics.cagr
    }

    pub fn max_drawdown(&self) -> f64 {
        self.statistics.max_drawdown
    }

    pub fn max_drawdown_duration(&self) -> usize {
        self.statistics.max_drawdown_duration
    }

    /// Looks a scalar up by name, e.g. `"sharpe"` or `"max_drawdown"`.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        name.parse::<Metric>()
            .ok()
            .map(|metric| self.statistics.get(metric))
    }

    /// Looks a series up by name: `"equity"`, `"returns"`, `"cum_returns"` or `"drawdowns"`.
    ///
    /// Returns the shared timestamp index together with the values.
    pub fn series(&self, name: &str) -> Option<(&[DateTime<Utc>], &[f64])> {
        let values = match name {
            "equity" => self.equity.values(),
            "returns" => self.returns.values(),
            "cum_returns" => self.cum_returns.values(),
            "drawdowns" => self.drawdowns.values(),
            _ => return None,
        };
        Some((self.equity.timestamps(), values))
    }

    /// Compounded returns per calendar period, computed on first request and then cached.
    pub fn aggregate(&self, granularity: Granularity) -> Result<&PeriodAggregate, AnalyticsError> {
        let cell = match granularity {
            Granularity::Monthly => &self.monthly,
            Granularity::Yearly => &self.yearly,
        };
        cell.get_or_init(|| {
            tracing::debug!(?granularity, "Aggregating returns");
            aggregate_returns(&self.returns, granularity)
        })
        .as_ref()
        .map_err(Clone::clone)
    }

    pub fn monthly_returns(&self) -> Result<&PeriodAggregate, AnalyticsError> {
        self.aggregate(Granularity::Monthly)
    }

    pub fn yearly_returns(&self) -> Result<&PeriodAggregate, AnalyticsError> {
        self.aggregate(Granularity::Yearly)
    }
}

impl PartialEq for StatisticsBundle {
    /// Compares the computed content; whether an aggregate has been cached yet is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.periods_per_year.to_bits() == other.periods_per_year.to_bits()
            && self.equity == other.equity
            && self.returns == other.returns
            && self.cum_returns == other.cum_returns
            && self.drawdowns == other.drawdowns
            && self.statistics == other.statistics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_types::{EquityPoint, Period};

    fn daily_curve(values: &[f64]) -> EquityCurve {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        EquityCurve::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| EquityPoint::new(base + Duration::days(i as i64), *v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn build_reference_curve() {
        let curve = daily_curve(&[100.0, 110.0, 99.0, 121.0]);
        let bundle = StatisticsBundle::build(&curve, 252.0).unwrap();

        assert_eq!(bundle.returns().len(), 4);
        assert!((bundle.max_drawdown() - 0.1).abs() < 1e-12);
        assert_eq!(bundle.max_drawdown_duration(), 1);
        let expected_cagr = 1.21_f64.powf(252.0 / 4.0) - 1.0;
        assert!((bundle.cagr() - expected_cagr).abs() / expected_cagr < 1e-9);
        assert!((bundle.statistics().total_return - 0.21).abs() < 1e-12);
        assert_eq!(
            bundle.statistics().max_drawdown_period,
            Some(DrawdownPeriod {
                start: curve.timestamps()[2],
                end: curve.timestamps()[2],
            })
        );
    }

    #[test]
    fn build_shares_index_and_leaves_input_untouched() {
        let curve = daily_curve(&[10.0, 11.0, 10.5]);
        let before = curve.clone();

        let bundle = StatisticsBundle::build(&curve, 252.0).unwrap();

        assert_eq!(curve, before);
        assert!(bundle.equity().shares_index_with(bundle.returns()));
        assert!(bundle.returns().shares_index_with(bundle.cum_returns()));
        assert!(bundle.cum_returns().shares_index_with(bundle.drawdowns()));
        assert_eq!(bundle.returns().timestamps(), curve.timestamps());
    }

    #[test]
    fn build_is_idempotent() {
        let curve = daily_curve(&[100.0, 101.0, 99.5, 104.0, 103.0, 108.0]);

        let first = StatisticsBundle::build(&curve, 252.0).unwrap();
        let second = StatisticsBundle::build(&curve, 252.0).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.sharpe().to_bits(), second.sharpe().to_bits());
        assert_eq!(first.sortino().to_bits(), second.sortino().to_bits());
        assert_eq!(first.cagr().to_bits(), second.cagr().to_bits());

        // Populating a cache does not change equality or the scalars.
        first.monthly_returns().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn build_rejects_invalid_inputs() {
        struct TestCase {
            values: Vec<f64>,
            periods_per_year: f64,
        }

        let cases = vec![
            // TC0: empty curve
            TestCase {
                values: vec![],
                periods_per_year: 252.0,
            },
            // TC1: non-positive equity
            TestCase {
                values: vec![100.0, -1.0],
                periods_per_year: 252.0,
            },
            // TC2: zero annualization factor
            TestCase {
                values: vec![100.0, 101.0],
                periods_per_year: 0.0,
            },
            // TC3: negative annualization factor
            TestCase {
                values: vec![100.0, 101.0],
                periods_per_year: -12.0,
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let result = StatisticsBundle::build(&daily_curve(&test.values), test.periods_per_year);
            assert!(
                matches!(result, Err(AnalyticsError::InvalidInput(_))),
                "TC{index} failed"
            );
        }
    }

    #[test]
    fn constant_curve_defines_zero_ratios() {
        let bundle = StatisticsBundle::build(&daily_curve(&[50.0; 20]), 252.0).unwrap();

        assert_eq!(bundle.sharpe(), 0.0);
        assert_eq!(bundle.sortino(), 0.0);
        assert_eq!(bundle.max_drawdown(), 0.0);
        assert_eq!(bundle.max_drawdown_duration(), 0);
        assert_eq!(bundle.cagr(), 0.0);
        assert_eq!(bundle.statistics().max_drawdown_period, None);
    }

    #[test]
    fn named_accessors() {
        let bundle = StatisticsBundle::build(&daily_curve(&[100.0, 110.0, 99.0, 121.0]), 252.0)
            .unwrap();

        assert_eq!(bundle.scalar("sharpe"), Some(bundle.sharpe()));
        assert_eq!(bundle.scalar("max_drawdown"), Some(bundle.max_drawdown()));
        assert_eq!(bundle.scalar("max_drawdown_pct"), Some(bundle.max_drawdown()));
        assert_eq!(bundle.scalar("max_drawdown_duration"), Some(1.0));
        assert_eq!(bundle.scalar("alpha"), None);

        let (index, values) = bundle.series("cum_returns").unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(values[0], 1.0);
        assert_eq!(bundle.series("equity").unwrap().1, &[100.0, 110.0, 99.0, 121.0]);
        assert!(bundle.series("drawdowns").is_some());
        assert!(bundle.series("positions").is_none());
    }

    #[test]
    fn aggregates_are_cached() {
        let bundle = StatisticsBundle::build(&daily_curve(&[100.0, 102.0, 101.0]), 252.0).unwrap();

        let first = bundle.yearly_returns().unwrap() as *const PeriodAggregate;
        let second = bundle.yearly_returns().unwrap() as *const PeriodAggregate;

        assert_eq!(first, second);
        let yearly = bundle.yearly_returns().unwrap();
        assert!((yearly.get(&Period::Year(2024)).unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert!("volatility".parse::<Metric>().is_err());
    }
}
