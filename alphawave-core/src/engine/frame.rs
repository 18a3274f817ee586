//! Per-bar indicator snapshot.
//!
//! `IndicatorFrame` keeps warming-up values as `None`. Fusion never reads the
//! options directly: it asks for a `DefinedFrame`, which fails with
//! `UndefinedIndicatorAccess` naming the first indicator still warming up.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::indicators::{ChannelBands, StopDirection, StopLevels, T3Values};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    /// Position of the bar in the evaluated history.
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub baseline: Option<f64>,
    pub wave: Option<f64>,
    pub channel: Option<ChannelBands>,
    pub density: Option<f64>,
    pub stop: Option<StopLevels>,
    pub t3: Option<T3Values>,
}

/// An `IndicatorFrame` whose every indicator has finished warming up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefinedFrame {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub baseline: f64,
    pub wave: f64,
    pub channel: ChannelBands,
    pub density: f64,
    pub stop: StopLevels,
    pub t3: T3Values,
}

impl DefinedFrame {
    pub fn direction(&self) -> StopDirection {
        self.stop.direction
    }
}

impl IndicatorFrame {
    pub fn is_defined(&self) -> bool {
        self.baseline.is_some()
            && self.wave.is_some()
            && self.channel.is_some()
            && self.density.is_some()
            && self.stop.is_some()
            && self.t3.is_some()
    }

    pub fn defined(&self) -> Result<DefinedFrame, SignalError> {
        Ok(DefinedFrame {
            index: self.index,
            timestamp: self.timestamp,
            high: self.high,
            low: self.low,
            close: self.close,
            baseline: self.require("baseline", self.baseline)?,
            wave: self.require("wave_pulse", self.wave)?,
            channel: self.require("quantum_channel", self.channel)?,
            density: self.require("momentum_density", self.density)?,
            stop: self.require("ratchet_stop", self.stop)?,
            t3: self.require("t3", self.t3)?,
        })
    }

    fn require<T>(&self, indicator: &'static str, value: Option<T>) -> Result<T, SignalError> {
        value.ok_or(SignalError::UndefinedIndicatorAccess {
            indicator,
            bar_index: self.index,
        })
    }
}
