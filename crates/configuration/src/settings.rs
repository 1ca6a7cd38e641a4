use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// The root configuration structure for a report run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportSettings,
    /// Strategy curves in report order.
    #[serde(default)]
    pub strategies: Vec<CurveSource>,
    #[serde(default)]
    pub benchmark: Option<CurveSource>,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Contains parameters for the report itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportSettings {
    /// Heading printed above the tearsheet.
    pub title: Option<String>,
    /// Number of return observations per year (252 for daily trading data, 12 for monthly).
    /// There is deliberately no default; it must come from the file, the environment or the CLI.
    pub periods_per_year: Option<f64>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout.
    pub output: Option<PathBuf>,
}

/// Where to read one equity curve from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurveSource {
    /// Report label. Strategies without one are named by position.
    pub label: Option<String>,
    /// A CSV file with a timestamp column and an equity column.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Display attributes for a single series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeriesStyle {
    pub color: String,
}

/// Assigns a style to the series with this exact label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleRule {
    pub label: String,
    pub color: String,
}

/// Explicit series label -> style mapping, plus the palette used for unmapped series.
///
/// The mapping is a list of rules rather than a table keyed by label because configuration
/// keys are not case-preserving.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub styles: Vec<StyleRule>,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            styles: Vec::new(),
            palette: default_palette(),
        }
    }
}

impl DisplaySettings {
    /// The configured style for `label`, or the palette colour for `position` if the label is
    /// unmapped. The palette wraps around, so the same position always gets the same colour.
    pub fn style_for(&self, label: &str, position: usize) -> Option<SeriesStyle> {
        if let Some(rule) = self.styles.iter().find(|rule| rule.label == label) {
            return Some(SeriesStyle {
                color: rule.color.clone(),
            });
        }
        if self.palette.is_empty() {
            return None;
        }
        Some(SeriesStyle {
            color: self.palette[position % self.palette.len()].clone(),
        })
    }
}

fn default_palette() -> Vec<String> {
    ["blue", "green", "magenta", "cyan", "yellow", "red"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Checks the settings that can only be judged once every source (file, environment and
    /// command line) has been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.report.periods_per_year {
            None => {
                return Err(ConfigError::ValidationError(
                    "report.periods_per_year must be set".to_string(),
                ));
            }
            Some(ppy) if !ppy.is_finite() || ppy <= 0.0 => {
                return Err(ConfigError::ValidationError(format!(
                    "report.periods_per_year must be a positive number, got {ppy}"
                )));
            }
            Some(_) => {}
        }

        if self.strategies.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one strategy curve is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in self.labels() {
            if !seen.insert(label.clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate curve label '{label}'"
                )));
            }
        }

        Ok(())
    }

    /// Resolved labels for all curves, strategies first, then the benchmark.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .strategies
            .iter()
            .enumerate()
            .map(|(i, source)| strategy_label(source, i))
            .collect();
        if let Some(benchmark) = &self.benchmark {
            labels.push(benchmark_label(benchmark));
        }
        labels
    }
}

/// The configured label for the strategy at `index`, or [`analytics::default_label`].
pub fn strategy_label(source: &CurveSource, index: usize) -> String {
    source
        .label
        .clone()
        .unwrap_or_else(|| analytics::default_label(index))
}

pub fn benchmark_label(source: &CurveSource) -> String {
    source
        .label
        .clone()
        .unwrap_or_else(|| "Benchmark".to_string())
}
