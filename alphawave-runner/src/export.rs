//! Export — CSV tape and JSON artifacts.
//!
//! - **CSV**: one row per bar with indicator values and the fused decision,
//!   ready for spreadsheets or pandas. Undefined values are empty cells.
//! - **JSON**: full tapes or scan results, round-trippable with serde.

use std::path::Path;

use anyhow::{Context, Result};

use crate::scan::ScanResult;
use crate::tape::SignalTape;

const TAPE_COLUMNS: [&str; 23] = [
    "index",
    "timestamp",
    "high",
    "low",
    "close",
    "baseline",
    "wave",
    "channel_center",
    "channel_upper",
    "channel_lower",
    "density",
    "long_stop",
    "short_stop",
    "stop_direction",
    "t3_fast",
    "t3_slow",
    "long_entry",
    "short_entry",
    "long_exit",
    "short_exit",
    "predictor_direction",
    "predictor_confidence",
    "vetoed",
];

fn num(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

fn flag(v: Option<bool>) -> String {
    v.map(|b| u8::from(b).to_string()).unwrap_or_default()
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Serialize a tape as CSV text.
pub fn tape_to_csv(tape: &SignalTape) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(TAPE_COLUMNS)?;

    for row in &tape.rows {
        let f = &row.frame;
        let d = row.decision.as_ref();
        wtr.write_record([
            f.index.to_string(),
            f.timestamp.to_string(),
            format!("{:.6}", f.high),
            format!("{:.6}", f.low),
            format!("{:.6}", f.close),
            num(f.baseline),
            num(f.wave),
            num(f.channel.map(|c| c.center)),
            num(f.channel.map(|c| c.upper)),
            num(f.channel.map(|c| c.lower)),
            num(f.density),
            num(f.stop.map(|s| s.long_stop)),
            num(f.stop.map(|s| s.short_stop)),
            f.stop.map(|s| s.direction.to_string()).unwrap_or_default(),
            num(f.t3.map(|t| t.fast)),
            num(f.t3.map(|t| t.slow)),
            flag(d.map(|d| d.long_entry)),
            flag(d.map(|d| d.short_entry)),
            flag(d.map(|d| d.long_exit)),
            flag(d.map(|d| d.short_exit)),
            d.map(|d| d.predictor_direction.to_string()).unwrap_or_default(),
            num(d.map(|d| d.predictor_confidence)),
            flag(d.map(|d| d.was_vetoed())),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn write_tape_csv(tape: &SignalTape, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let csv = tape_to_csv(tape)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn tape_to_json(tape: &SignalTape) -> Result<String> {
    serde_json::to_string_pretty(tape).context("failed to serialize tape to JSON")
}

pub fn tape_from_json(json: &str) -> Result<SignalTape> {
    serde_json::from_str(json).context("failed to deserialize tape from JSON")
}

pub fn scan_to_json(results: &[ScanResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize scan results to JSON")
}
