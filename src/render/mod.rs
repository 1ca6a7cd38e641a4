//! Turns a [`Comparison`] into text and sends it somewhere.
//!
//! Renderers never compute statistics. Everything they print is read from the bundles, and a
//! curve whose bundle could not be built is shown as "N/A".

mod json;
mod table;
mod target;

pub use json::JsonRenderer;
pub use table::TableRenderer;
pub use target::{FileTarget, RenderTarget, StdoutTarget};

use analytics::{Comparison, Metric};
use anyhow::Result;
use configuration::{DisplaySettings, SeriesStyle};
use std::collections::HashMap;

pub(crate) const NOT_AVAILABLE: &str = "N/A";

/// Produces the textual form of a report.
pub trait ReportRenderer {
    fn render(&self, report: &Comparison, styles: &DisplayStyles) -> Result<String>;
}

/// The resolved style of every series in one report, keyed by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayStyles {
    styles: HashMap<String, SeriesStyle>,
}

impl DisplayStyles {
    /// Resolves a style for each label: the configured one if present, otherwise the palette
    /// entry for the label's position in the report.
    pub fn resolve(settings: &DisplaySettings, report: &Comparison) -> Self {
        let styles = report
            .entries()
            .enumerate()
            .filter_map(|(position, entry)| {
                settings
                    .style_for(&entry.label, position)
                    .map(|style| (entry.label.clone(), style))
            })
            .collect();
        Self { styles }
    }

    pub fn get(&self, label: &str) -> Option<&SeriesStyle> {
        self.styles.get(label)
    }
}

/// Formats a scalar the way it is shown in a tearsheet.
pub(crate) fn format_metric(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Sharpe | Metric::Sortino => format!("{value:.2}"),
        Metric::MaxDrawdownDuration => format!("{value:.0} periods"),
        Metric::TotalReturn | Metric::Cagr | Metric::AnnualVolatility | Metric::MaxDrawdown => {
            format_percent(value)
        }
    }
}

pub(crate) fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
