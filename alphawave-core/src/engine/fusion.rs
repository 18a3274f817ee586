//! Rule fusion — turns the prior and current frames into entry/exit triggers,
//! then lets a confident predictor veto the opposite-side entry.
//!
//! Long entry = stop flipped to LONG this bar
//!            & close above baseline
//!            & WavePulse rising with close above it
//!            & channel center rising with close above it
//!            & density above the gate threshold.
//! Short entry mirrors every condition. Exits fire on the opposite flip or
//! when the bar trades through the opposing committed stop.
//!
//! The predictor never creates an entry: `up` above the confidence threshold
//! clears a short entry, `down` clears a long entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::indicators::StopDirection;
use crate::predictor::{PredictorDirection, PredictorOutput};

use super::frame::DefinedFrame;

/// Individual rule conditions for one bar, kept for auditing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConditions {
    /// sign(close - baseline): +1, 0 or -1.
    pub trend: i8,
    pub momentum_long: bool,
    pub momentum_short: bool,
    pub channel_long: bool,
    pub channel_short: bool,
    pub gate_ok: bool,
    pub flipped_long: bool,
    pub flipped_short: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSignal {
    pub long_entry: bool,
    pub short_entry: bool,
    pub long_exit: bool,
    pub short_exit: bool,
}

/// Fused decision for the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub timestamp: NaiveDateTime,
    pub long_entry: bool,
    pub short_entry: bool,
    pub long_exit: bool,
    pub short_exit: bool,
    pub predictor_direction: PredictorDirection,
    pub predictor_confidence: f64,
    /// Rule result before the predictor veto.
    pub rule: RuleSignal,
}

impl SignalDecision {
    pub fn has_entry(&self) -> bool {
        self.long_entry || self.short_entry
    }

    pub fn has_exit(&self) -> bool {
        self.long_exit || self.short_exit
    }

    /// True when the predictor cleared an entry the rules produced.
    pub fn was_vetoed(&self) -> bool {
        (self.rule.long_entry && !self.long_entry) || (self.rule.short_entry && !self.short_entry)
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

pub fn entry_conditions(
    prev: &DefinedFrame,
    cur: &DefinedFrame,
    density_threshold: f64,
) -> EntryConditions {
    let wave_rising = cur.wave > prev.wave;
    let wave_falling = cur.wave < prev.wave;
    let center_rising = cur.channel.center > prev.channel.center;
    let center_falling = cur.channel.center < prev.channel.center;

    EntryConditions {
        trend: sign(cur.close - cur.baseline),
        momentum_long: wave_rising && cur.close > cur.wave,
        momentum_short: wave_falling && cur.close < cur.wave,
        channel_long: center_rising && cur.close > cur.channel.center,
        channel_short: center_falling && cur.close < cur.channel.center,
        gate_ok: cur.density > density_threshold,
        flipped_long: prev.direction() == StopDirection::Short
            && cur.direction() == StopDirection::Long,
        flipped_short: prev.direction() == StopDirection::Long
            && cur.direction() == StopDirection::Short,
    }
}

pub fn evaluate_rules(prev: &DefinedFrame, cur: &DefinedFrame, density_threshold: f64) -> RuleSignal {
    let c = entry_conditions(prev, cur, density_threshold);
    RuleSignal {
        long_entry: c.flipped_long && c.trend == 1 && c.momentum_long && c.channel_long && c.gate_ok,
        short_entry: c.flipped_short
            && c.trend == -1
            && c.momentum_short
            && c.channel_short
            && c.gate_ok,
        long_exit: c.flipped_short || cur.high > cur.stop.short_stop,
        short_exit: c.flipped_long || cur.low < cur.stop.long_stop,
    }
}

/// Apply the predictor veto. Only a valid output with confidence strictly
/// above `confidence_threshold` has any effect.
pub fn apply_veto(
    rule: RuleSignal,
    prediction: Option<&PredictorOutput>,
    confidence_threshold: f64,
) -> RuleSignal {
    let Some(p) = prediction.filter(|p| p.check().is_ok()) else {
        return rule;
    };
    if p.confidence <= confidence_threshold {
        return rule;
    }
    match p.direction {
        PredictorDirection::Up => RuleSignal {
            short_entry: false,
            ..rule
        },
        PredictorDirection::Down => RuleSignal {
            long_entry: false,
            ..rule
        },
        PredictorDirection::None => rule,
    }
}

pub fn fuse(
    prev: &DefinedFrame,
    cur: &DefinedFrame,
    prediction: Option<&PredictorOutput>,
    density_threshold: f64,
    confidence_threshold: f64,
) -> SignalDecision {
    let rule = evaluate_rules(prev, cur, density_threshold);
    let fused = apply_veto(rule, prediction, confidence_threshold);
    let (predictor_direction, predictor_confidence) = prediction
        .filter(|p| p.check().is_ok())
        .map_or((PredictorDirection::None, 0.0), |p| (p.direction, p.confidence));

    SignalDecision {
        timestamp: cur.timestamp,
        long_entry: fused.long_entry,
        short_entry: fused.short_entry,
        long_exit: fused.long_exit,
        short_exit: fused.short_exit,
        predictor_direction,
        predictor_confidence,
        rule,
    }
}
