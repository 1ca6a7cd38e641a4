use super::{DisplayStyles, ReportRenderer};
use analytics::{
    Comparison, ComparisonEntry, PeriodAggregate, ScalarStatistics, StatisticsBundle,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Machine-readable report: scalar statistics, period aggregates and the equity, growth and
/// drawdown curves for every curve, ready for plotting.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    title: Option<String>,
}

impl JsonRenderer {
    pub fn new(title: Option<String>) -> Self {
        Self { title }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: Option<&'a str>,
    periods_per_year: f64,
    strategies: Vec<JsonEntry<'a>>,
    benchmark: Option<JsonEntry<'a>>,
}

/// An unavailable curve carries `error` and no figures.
#[derive(Serialize)]
struct JsonEntry<'a> {
    label: &'a str,
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    statistics: Option<&'a ScalarStatistics>,
    monthly_returns: Option<&'a PeriodAggregate>,
    yearly_returns: Option<&'a PeriodAggregate>,
    series: Option<JsonSeries<'a>>,
}

/// The plottable series of one bundle, aligned to a single timestamp column.
#[derive(Serialize)]
struct JsonSeries<'a> {
    timestamps: &'a [DateTime<Utc>],
    equity: &'a [f64],
    cum_returns: &'a [f64],
    drawdowns: &'a [f64],
}

impl<'a> JsonSeries<'a> {
    fn new(bundle: &'a StatisticsBundle) -> Option<Self> {
        let (timestamps, equity) = bundle.series("equity")?;
        let (_, cum_returns) = bundle.series("cum_returns")?;
        let (_, drawdowns) = bundle.series("drawdowns")?;
        Some(Self {
            timestamps,
            equity,
            cum_returns,
            drawdowns,
        })
    }
}

impl<'a> JsonEntry<'a> {
    fn new(entry: &'a ComparisonEntry, styles: &'a DisplayStyles) -> Self {
        let color = styles.get(&entry.label).map(|s| s.color.as_str());
        match &entry.bundle {
            Ok(bundle) => Self {
                label: &entry.label,
                color,
                error: None,
                statistics: Some(bundle.statistics()),
                monthly_returns: bundle.monthly_returns().ok(),
                yearly_returns: bundle.yearly_returns().ok(),
                series: JsonSeries::new(bundle),
            },
            Err(e) => Self {
                label: &entry.label,
                color,
                error: Some(e.to_string()),
                statistics: None,
                monthly_returns: None,
                yearly_returns: None,
                series: None,
            },
        }
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Comparison, styles: &DisplayStyles) -> Result<String> {
        let document = JsonReport {
            title: self.title.as_deref(),
            periods_per_year: report.periods_per_year(),
            strategies: report
                .strategies()
                .iter()
                .map(|entry| JsonEntry::new(entry, styles))
                .collect(),
            benchmark: report.benchmark().map(|entry| JsonEntry::new(entry, styles)),
        };

        Ok(serde_json::to_string_pretty(&document)?)
    }
}
