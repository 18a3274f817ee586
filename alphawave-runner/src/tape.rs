//! Signal tape — bar-by-bar replay of the engine over one instrument.
//!
//! Each row carries the indicator frame and, once warmup is over, the fused
//! decision the engine would have emitted at that bar. There are no fills or
//! positions here; the tape is the raw signal stream a harness would consume.

use alphawave_core::indicators::StopDirection;
use alphawave_core::{Bar, IndicatorFrame, SignalDecision, SignalEngine};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeRow {
    pub frame: IndicatorFrame,
    /// `None` while the engine reports insufficient history.
    pub decision: Option<SignalDecision>,
}

impl TapeRow {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.frame.timestamp
    }

    pub fn stop_direction(&self) -> Option<StopDirection> {
        self.frame.stop.map(|s| s.direction)
    }
}

/// Event counts over a tape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeSummary {
    pub bars: usize,
    pub decided: usize,
    pub long_entries: usize,
    pub short_entries: usize,
    pub long_exits: usize,
    pub short_exits: usize,
    pub vetoed: usize,
    pub stop_flips: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTape {
    pub symbol: String,
    pub params_fingerprint: String,
    pub rows: Vec<TapeRow>,
}

impl SignalTape {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that carry an entry after the predictor veto.
    pub fn entries(&self) -> impl Iterator<Item = &TapeRow> {
        self.rows
            .iter()
            .filter(|r| r.decision.is_some_and(|d| d.has_entry()))
    }

    pub fn last_decision(&self) -> Option<&SignalDecision> {
        self.rows.iter().rev().find_map(|r| r.decision.as_ref())
    }

    pub fn summary(&self) -> TapeSummary {
        let mut s = TapeSummary {
            bars: self.rows.len(),
            ..TapeSummary::default()
        };
        for d in self.rows.iter().filter_map(|r| r.decision.as_ref()) {
            s.decided += 1;
            s.long_entries += d.long_entry as usize;
            s.short_entries += d.short_entry as usize;
            s.long_exits += d.long_exit as usize;
            s.short_exits += d.short_exit as usize;
            s.vetoed += d.was_vetoed() as usize;
        }
        s.stop_flips = self
            .rows
            .windows(2)
            .filter(|w| match (w[0].stop_direction(), w[1].stop_direction()) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            })
            .count();
        s
    }
}

/// Replay `bars` through a fresh stream of `engine`.
///
/// The predictor (if any) is consulted once per decidable bar with the history
/// prefix ending at that bar, so the tape never uses future bars.
pub fn replay(engine: &SignalEngine, symbol: &str, bars: &[Bar]) -> SignalTape {
    let mut stream = engine.stream();
    let warmup = engine.params().warmup_bars();
    let mut rows = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let frame = stream.push(bar).clone();
        let decision = if i + 1 >= warmup {
            let prediction = engine.predict(&bars[..=i]);
            stream.decide(prediction.as_ref()).ok()
        } else {
            None
        };
        rows.push(TapeRow { frame, decision });
    }

    let tape = SignalTape {
        symbol: symbol.to_string(),
        params_fingerprint: engine.params().fingerprint(),
        rows,
    };
    debug!(symbol, bars = tape.len(), summary = ?tape.summary(), "replayed");
    tape
}
