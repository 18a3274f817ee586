//! Parallel universe scan.
//!
//! One rayon task per instrument. Each task builds its own stream from the
//! shared (immutable) engine, so no indicator state crosses threads.

use alphawave_core::{Bar, SignalDecision, SignalEngine, SignalError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::tape::{replay, SignalTape};

/// One instrument's bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Decided { decision: SignalDecision },
    Warming { required: usize, available: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub bars: usize,
    pub outcome: ScanOutcome,
}

impl ScanResult {
    pub fn decision(&self) -> Option<&SignalDecision> {
        match &self.outcome {
            ScanOutcome::Decided { decision } => Some(decision),
            ScanOutcome::Warming { .. } | ScanOutcome::Failed { .. } => None,
        }
    }
}

fn scan_one(engine: &SignalEngine, instrument: &Instrument) -> ScanResult {
    let outcome = match engine.evaluate(&instrument.bars) {
        Ok(decision) => ScanOutcome::Decided { decision },
        Err(SignalError::InsufficientHistory {
            required,
            available,
        }) => ScanOutcome::Warming {
            required,
            available,
        },
        Err(other) => {
            warn!(symbol = %instrument.symbol, error = %other, "scan failed");
            ScanOutcome::Failed {
                error: other.to_string(),
            }
        }
    };
    ScanResult {
        symbol: instrument.symbol.clone(),
        bars: instrument.bars.len(),
        outcome,
    }
}

/// Latest-bar decision for every instrument, in input order.
pub fn scan_latest(engine: &SignalEngine, universe: &[Instrument]) -> Vec<ScanResult> {
    info!(instruments = universe.len(), "scanning latest bar");
    let results: Vec<ScanResult> = universe
        .par_iter()
        .map(|instrument| scan_one(engine, instrument))
        .collect();
    let entries = results
        .iter()
        .filter(|r| r.decision().is_some_and(|d| d.has_entry()))
        .count();
    info!(instruments = results.len(), entries, "scan complete");
    results
}

/// Full tapes for every instrument, in input order.
pub fn scan_tapes(engine: &SignalEngine, universe: &[Instrument]) -> Vec<SignalTape> {
    info!(instruments = universe.len(), "replaying universe");
    universe
        .par_iter()
        .map(|instrument| replay(engine, &instrument.symbol, &instrument.bars))
        .collect()
}
