mod loader;
mod render;
mod telemetry;

use analytics::{Comparison, ComparisonEntry, CurveInput};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::{
    Config, CurveSource, OutputFormat, benchmark_label, load_config, strategy_label,
};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use render::{
    DisplayStyles, FileTarget, JsonRenderer, RenderTarget, ReportRenderer, StdoutTarget,
    TableRenderer,
};
use std::path::PathBuf;

/// The main entry point for the tearsheet application.
#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; it only supplies TEARSHEET__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance tearsheets for strategy equity curves.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute statistics for one or more equity curves and render a report.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// Path to a TOML configuration file. Defaults to `tearsheet.toml` if it exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// A strategy curve as LABEL=PATH, or just PATH. Repeatable; replaces configured strategies.
    #[arg(long = "strategy", value_parser = parse_curve_source)]
    strategies: Vec<CurveSource>,

    /// The benchmark curve as LABEL=PATH, or just PATH.
    #[arg(long, value_parser = parse_curve_source)]
    benchmark: Option<CurveSource>,

    /// Return observations per year (e.g. 252 for daily, 12 for monthly).
    #[arg(long)]
    periods_per_year: Option<f64>,

    /// Heading printed above the report.
    #[arg(long)]
    title: Option<String>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ReportArgs {
    /// Command-line values take precedence over the file and the environment.
    fn apply_to(self, config: &mut Config) {
        if !self.strategies.is_empty() {
            config.strategies = self.strategies;
        }
        if self.benchmark.is_some() {
            config.benchmark = self.benchmark;
        }
        if self.periods_per_year.is_some() {
            config.report.periods_per_year = self.periods_per_year;
        }
        if self.title.is_some() {
            config.report.title = self.title;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if self.output.is_some() {
            config.report.output = self.output;
        }
    }
}

fn parse_curve_source(raw: &str) -> Result<CurveSource, String> {
    let (label, path) = match raw.split_once('=') {
        Some((label, path)) => (Some(label.trim()), path.trim()),
        None => (None, raw.trim()),
    };
    if path.is_empty() {
        return Err(format!("no file path in '{raw}'"));
    }
    Ok(CurveSource {
        label: label.filter(|l| !l.is_empty()).map(str::to_string),
        path: PathBuf::from(path),
    })
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Handles the orchestration of a report run.
async fn handle_report(args: ReportArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate()?;

    let _log_guard = telemetry::init(&config.logging)?;

    // `validate` has already checked this is present and positive.
    let periods_per_year = config
        .report
        .periods_per_year
        .context("periods_per_year is required")?;

    let comparison = build_comparison(&config, periods_per_year).await?;
    let styles = DisplayStyles::resolve(&config.display, &comparison);

    let renderer: Box<dyn ReportRenderer> = match config.report.format {
        OutputFormat::Table => Box::new(TableRenderer::new(config.report.title.clone())),
        OutputFormat::Json => Box::new(JsonRenderer::new(config.report.title.clone())),
    };
    let rendered = renderer.render(&comparison, &styles)?;

    let mut target: Box<dyn RenderTarget> = match &config.report.output {
        Some(path) => Box::new(FileTarget::new(path)),
        None => Box::new(StdoutTarget),
    };
    target.write(&rendered)
}

/// Loads every curve and builds its statistics, one blocking task per curve.
///
/// A file that cannot be read aborts the run. A curve that loads but cannot be analysed is
/// kept as an unavailable entry.
async fn build_comparison(config: &Config, periods_per_year: f64) -> Result<Comparison> {
    let mut sources: Vec<(String, PathBuf)> = config
        .strategies
        .iter()
        .enumerate()
        .map(|(i, source)| (strategy_label(source, i), source.path.clone()))
        .collect();
    if let Some(benchmark) = &config.benchmark {
        sources.push((benchmark_label(benchmark), benchmark.path.clone()));
    }

    // Set up the progress bar
    let progress_bar = ProgressBar::new(sources.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // Create concurrent tasks for each curve
    let tasks: Vec<_> = sources
        .into_iter()
        .map(|(label, path)| {
            let pb_clone = progress_bar.clone();
            tokio::task::spawn_blocking(move || {
                pb_clone.set_message(format!("Analysing {label}..."));
                let curve = loader::load_equity_curve(&path)?;
                let entry = ComparisonEntry::build(&CurveInput::new(label, curve), periods_per_year);
                pb_clone.inc(1);
                Ok::<ComparisonEntry, anyhow::Error>(entry)
            })
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let results = join_all(tasks).await;

    progress_bar.finish_and_clear();

    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        entries.push(result.context("A curve task panicked")??);
    }

    let benchmark = if config.benchmark.is_some() {
        entries.pop()
    } else {
        None
    };

    Ok(Comparison::from_entries(entries, benchmark, periods_per_year)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_curve_sources() {
        struct TestCase {
            input: &'static str,
            expected: Option<CurveSource>,
        }

        let cases = vec![
            // TC0: label and path
            TestCase {
                input: "Momentum=data/momentum.csv",
                expected: Some(CurveSource {
                    label: Some("Momentum".to_string()),
                    path: PathBuf::from("data/momentum.csv"),
                }),
            },
            // TC1: path only
            TestCase {
                input: "data/carry.csv",
                expected: Some(CurveSource {
                    label: None,
                    path: PathBuf::from("data/carry.csv"),
                }),
            },
            // TC2: empty label
            TestCase {
                input: "=spy.csv",
                expected: Some(CurveSource {
                    label: None,
                    path: PathBuf::from("spy.csv"),
                }),
            },
            // TC3: no path
            TestCase {
                input: "Momentum=",
                expected: None,
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            assert_eq!(
                parse_curve_source(test.input).ok(),
                test.expected,
                "TC{index} failed"
            );
        }
    }

    #[test]
    fn command_line_overrides_configuration() {
        let cli = Cli::parse_from([
            "tearsheet",
            "report",
            "--strategy",
            "A=a.csv",
            "--strategy",
            "b.csv",
            "--periods-per-year",
            "12",
            "--format",
            "json",
        ]);
        let Commands::Report(args) = cli.command;

        let mut config = Config::default();
        config.report.title = Some("From file".to_string());
        args.apply_to(&mut config);

        assert_eq!(config.labels(), vec!["A", "Strategy 2"]);
        assert_eq!(config.report.periods_per_year, Some(12.0));
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.title.as_deref(), Some("From file"));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn builds_comparison_from_files() {
        let dir = std::env::temp_dir().join(format!("tearsheet-main-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let strategy = dir.join("strategy.csv");
        let benchmark = dir.join("benchmark.csv");
        std::fs::write(&strategy, "date,equity\n2024-01-01,100\n2024-01-02,110\n").unwrap();
        std::fs::write(&benchmark, "date,equity\n2024-01-01,50\n2024-01-02,49\n").unwrap();

        let config = Config {
            strategies: vec![CurveSource {
                label: None,
                path: strategy,
            }],
            benchmark: Some(CurveSource {
                label: Some("Index".to_string()),
                path: benchmark,
            }),
            ..Default::default()
        };

        let comparison = build_comparison(&config, 252.0).await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(comparison.strategies().len(), 1);
        assert_eq!(comparison.strategies()[0].label, "Strategy 1");
        let (_, primary) = comparison.primary().unwrap();
        assert!((primary.statistics().total_return - 0.10).abs() < 1e-12);
        let benchmark = comparison.benchmark().unwrap();
        assert_eq!(benchmark.label, "Index");
        assert!(benchmark.is_available());
    }
}
