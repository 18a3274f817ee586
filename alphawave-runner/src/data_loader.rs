//! CSV bar loading.
//!
//! Columns are matched by header name (case variants and the usual vendor
//! spellings are accepted); extra columns such as `Adj Close` are ignored.
//! Rows become a `BarHistory`, so out-of-order or duplicate timestamps are
//! rejected with the offending line number.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use alphawave_core::{Bar, BarError, BarHistory};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: unrecognised timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("line {line}: invalid bar ({reason})")]
    InvalidBar { line: u64, reason: String },

    #[error("line {line}: {source}")]
    Order { line: u64, source: BarError },

    #[error("no bars in input")]
    Empty,
}

/// Options controlling how rows are accepted.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Drop rows with missing prices or inconsistent OHLC instead of failing.
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(
        alias = "Timestamp",
        alias = "Date",
        alias = "date",
        alias = "Datetime",
        alias = "datetime",
        alias = "time",
        alias = "Time"
    )]
    timestamp: String,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume", default)]
    volume: Option<f64>,
}

/// Parse the timestamp spellings found in exported bar files: RFC 3339,
/// `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS`, plain dates, and unix
/// seconds or milliseconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    let epoch: i64 = value.parse().ok()?;
    // Anything past year 5138 in seconds is taken as milliseconds.
    let dt = if epoch.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(epoch)?
    } else {
        DateTime::from_timestamp(epoch, 0)?
    };
    Some(dt.naive_utc())
}

/// Load bars from a CSV file.
pub fn load_csv(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<BarHistory, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let history = read_bars(file, opts)?;
    debug!(path = %path.display(), bars = history.len(), "loaded bars");
    Ok(history)
}

/// Read bars from any CSV source with a header row.
pub fn read_bars<R: Read>(reader: R, opts: &LoadOptions) -> Result<BarHistory, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut history = BarHistory::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize::<CsvBar>() {
        let row = result?;
        // Header is line 1.
        let line = history.len() as u64 + skipped as u64 + 2;

        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            line,
            value: row.timestamp.clone(),
        })?;
        let bar = Bar::new(
            timestamp,
            row.open.unwrap_or(f64::NAN),
            row.high.unwrap_or(f64::NAN),
            row.low.unwrap_or(f64::NAN),
            row.close.unwrap_or(f64::NAN),
            row.volume.unwrap_or(0.0),
        );

        if !bar.is_sane() {
            if opts.skip_invalid_rows {
                skipped += 1;
                continue;
            }
            let reason = if bar.is_void() {
                "missing price".to_string()
            } else {
                format!(
                    "inconsistent OHLC o={} h={} l={} c={}",
                    bar.open, bar.high, bar.low, bar.close
                )
            };
            return Err(LoadError::InvalidBar { line, reason });
        }

        history
            .push(bar)
            .map_err(|source| LoadError::Order { line, source })?;
    }

    if skipped > 0 {
        warn!(skipped, "dropped invalid rows");
    }
    if history.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(history)
}
