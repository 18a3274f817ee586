//! Append-only bar history.
//!
//! The engine reads any prefix of a history as a plain `&[Bar]`; `BarHistory`
//! is the owning side that enforces timestamp ordering on append.

use std::ops::Deref;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar at {incoming} is not after the last bar at {last}")]
    OutOfOrder {
        last: NaiveDateTime,
        incoming: NaiveDateTime,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarHistory {
    bars: Vec<Bar>,
}

impl BarHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bars: Vec::with_capacity(capacity),
        }
    }

    /// Build a history from bars, validating the ordering of every bar.
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Result<Self, BarError> {
        let mut history = Self::new();
        for bar in bars {
            history.push(bar)?;
        }
        Ok(history)
    }

    /// Append a bar. Duplicate or earlier timestamps are rejected.
    pub fn push(&mut self, bar: Bar) -> Result<(), BarError> {
        if let Some(last) = self.bars.last() {
            if bar.timestamp <= last.timestamp {
                return Err(BarError::OutOfOrder {
                    last: last.timestamp,
                    incoming: bar.timestamp,
                });
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    pub fn bar_at(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// The first `len` bars (clamped to the history length).
    pub fn prefix(&self, len: usize) -> &[Bar] {
        &self.bars[..len.min(self.bars.len())]
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn into_inner(self) -> Vec<Bar> {
        self.bars
    }
}

impl Deref for BarHistory {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}

impl AsRef<[Bar]> for BarHistory {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}
