use super::{DisplayStyles, NOT_AVAILABLE, ReportRenderer, format_metric, format_percent};
use analytics::{Comparison, ComparisonEntry, Metric, PeriodAggregate};
use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use core_types::Period;
use std::fmt::Write;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Plain-text tearsheet: a summary table for every curve followed by the monthly and yearly
/// returns of the first strategy.
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    title: Option<String>,
}

impl TableRenderer {
    pub fn new(title: Option<String>) -> Self {
        Self { title }
    }

    fn summary_table(&self, report: &Comparison, styles: &DisplayStyles) -> Table {
        let entries: Vec<&ComparisonEntry> = report.entries().collect();

        let mut header = vec![Cell::new("Metric")];
        header.extend(entries.iter().map(|entry| {
            let cell = Cell::new(&entry.label);
            match styles.get(&entry.label).and_then(|s| parse_color(&s.color)) {
                Some(color) => cell.fg(color),
                None => cell,
            }
        }));

        let mut table = new_table();
        table.set_header(header);

        let mut start = vec![Cell::new("Start")];
        let mut end = vec![Cell::new("End")];
        for entry in &entries {
            let bounds = entry.bundle.as_ref().ok().and_then(|bundle| {
                let timestamps = bundle.equity().timestamps();
                Some((timestamps.first()?, timestamps.last()?))
            });
            match bounds {
                Some((first, last)) => {
                    start.push(value_cell(first.format("%Y-%m-%d").to_string()));
                    end.push(value_cell(last.format("%Y-%m-%d").to_string()));
                }
                None => {
                    start.push(value_cell(NOT_AVAILABLE));
                    end.push(value_cell(NOT_AVAILABLE));
                }
            }
        }
        table.add_row(start);
        table.add_row(end);

        for metric in Metric::ALL {
            let mut row = vec![Cell::new(metric.label())];
            row.extend(entries.iter().map(|entry| match &entry.bundle {
                Ok(bundle) => value_cell(format_metric(metric, bundle.statistics().get(metric))),
                Err(_) => value_cell(NOT_AVAILABLE),
            }));
            table.add_row(row);
        }

        table
    }
}

impl ReportRenderer for TableRenderer {
    fn render(&self, report: &Comparison, styles: &DisplayStyles) -> Result<String> {
        let mut out = String::new();

        if let Some(title) = &self.title {
            writeln!(out, "{title}")?;
            writeln!(out, "{}", "=".repeat(title.chars().count()))?;
        }
        writeln!(
            out,
            "Annualization: {} periods per year",
            report.periods_per_year()
        )?;
        writeln!(out)?;
        writeln!(out, "{}", self.summary_table(report, styles))?;

        // A strategy that failed is still listed above, with N/A for every figure.
        for entry in report.entries().filter(|e| !e.is_available()) {
            if let Err(e) = &entry.bundle {
                writeln!(out, "{}: {e}", entry.label)?;
            }
        }

        let Some((label, bundle)) = report.primary() else {
            writeln!(out)?;
            writeln!(out, "Monthly Returns: {NOT_AVAILABLE}")?;
            writeln!(out, "Yearly Returns: {NOT_AVAILABLE}")?;
            return Ok(out);
        };

        writeln!(out)?;
        match bundle.monthly_returns() {
            Ok(monthly) => {
                writeln!(out, "Monthly Returns ({label})")?;
                writeln!(out, "{}", monthly_grid(monthly))?;
            }
            Err(e) => writeln!(out, "Monthly Returns ({label}): {NOT_AVAILABLE} ({e})")?,
        }

        writeln!(out)?;
        match bundle.yearly_returns() {
            Ok(yearly) => {
                writeln!(out, "Yearly Returns ({label})")?;
                writeln!(out, "{}", yearly_table(yearly))?;
            }
            Err(e) => writeln!(out, "Yearly Returns ({label}): {NOT_AVAILABLE} ({e})")?,
        }

        Ok(out)
    }
}

/// Years down, months across. Months without observations are left blank.
fn monthly_grid(monthly: &PeriodAggregate) -> Table {
    let mut header = vec![Cell::new("Year")];
    header.extend(MONTHS.iter().map(Cell::new));

    let mut table = new_table();
    table.set_header(header);

    for year in monthly.years() {
        let mut row = vec![Cell::new(year)];
        row.extend((1..=12).map(|month| {
            let value = monthly
                .get(&Period::Month { year, month })
                .map(format_percent)
                .unwrap_or_default();
            value_cell(value)
        }));
        table.add_row(row);
    }

    table
}

fn yearly_table(yearly: &PeriodAggregate) -> Table {
    let mut table = new_table();
    table.set_header(vec![Cell::new("Year"), Cell::new("Return")]);
    for (period, value) in yearly.iter() {
        table.add_row(vec![Cell::new(period), value_cell(format_percent(value))]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn value_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Maps a configured colour name (or `#rrggbb`) to a terminal colour.
fn parse_color(name: &str) -> Option<Color> {
    let name = name.trim().to_ascii_lowercase();

    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }

    let color = match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "darkgrey" | "darkgray" | "dark_grey" => Color::DarkGrey,
        _ => {
            tracing::warn!(color = %name, "Unknown display colour; series left unstyled");
            return None;
        }
    };
    Some(color)
}
