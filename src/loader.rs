//! Reads equity curves from CSV files.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core_types::EquityCurve;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of an equity file. Columns other than these two are ignored.
#[derive(Debug, Deserialize)]
struct EquityRow {
    #[serde(alias = "date", alias = "Date", alias = "Timestamp")]
    timestamp: String,
    #[serde(alias = "Equity")]
    equity: Decimal,
}

/// Loads an equity curve from a CSV file with a header row.
pub fn load_equity_curve(path: &Path) -> Result<EquityCurve> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open equity file: {}", path.display()))?;

    let curve = read_equity_curve(file, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), points = curve.len(), "Loaded equity curve");
    Ok(curve)
}

/// Parses CSV equity data; `source` names the input in error messages.
pub fn read_equity_curve<R: Read>(input: R, source: &str) -> Result<EquityCurve> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader
        .headers()
        .with_context(|| format!("{source}: failed to read header row"))?
        .clone();

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("{source}: malformed CSV"))?;
        let line = record.position().map_or(0, |p| p.line());

        let row: EquityRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("{source}, line {line}: invalid row"))?;
        let timestamp = parse_timestamp(row.timestamp.trim())
            .with_context(|| format!("{source}, line {line}: invalid timestamp"))?;

        points.push((timestamp, row.equity));
    }

    EquityCurve::from_decimal(&points).with_context(|| format!("{source}: invalid equity curve"))
}

/// Naive date-time layouts, taken as UTC. `%.f` also matches a missing fraction.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Accepts RFC 3339, a naive date-time with a space or `T` separator and optional fractional
/// seconds (taken as UTC), or a bare `YYYY-MM-DD` (midnight UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts.and_utc());
        }
    }
    bail!("unrecognised timestamp '{raw}'")
}
