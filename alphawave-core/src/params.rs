//! Strategy parameters — one flat table covering every indicator and the fusion rule.
//!
//! Defaults reproduce the reference AlphaWave settings. Everything is checked
//! up front by `validate`; an engine is never built from an invalid table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::indicators::{
    MomentumDensity, PriceSource, QuantumChannel, QuantumMa, RatchetStop, StopDirection, T3Pair,
    WavePulse,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyParams {
    // ── Adaptive baseline ──
    pub baseline_adx_length: usize,
    pub baseline_weight: f64,
    pub baseline_ma_length: usize,

    // ── WavePulse ──
    pub wave_smooth_period: usize,
    pub wave_constant_factor: f64,

    // ── Quantum channel ──
    pub channel_source: PriceSource,
    pub channel_poles: usize,
    pub channel_period: usize,
    pub channel_multiplier: f64,

    // ── Momentum density gate ──
    pub density_ma_length: usize,
    pub density_calc_length: usize,
    pub density_smooth_length: usize,
    pub density_threshold: f64,

    // ── Ratchet stop ──
    pub stop_atr_length: usize,
    pub stop_atr_multiplier: f64,
    pub stop_use_wicks: bool,
    pub stop_initial_direction: StopDirection,

    // ── T3 pair ──
    pub t3_fast_length: usize,
    pub t3_slow_length: usize,
    pub t3_factor: f64,

    // ── Predictor veto ──
    pub confidence_threshold: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            baseline_adx_length: 2,
            baseline_weight: 10.0,
            baseline_ma_length: 6,
            wave_smooth_period: 21,
            wave_constant_factor: 0.4,
            channel_source: PriceSource::Hlc3,
            channel_poles: 4,
            channel_period: 144,
            channel_multiplier: 1.414,
            density_ma_length: 100,
            density_calc_length: 60,
            density_smooth_length: 3,
            density_threshold: 90.0,
            stop_atr_length: 22,
            stop_atr_multiplier: 3.0,
            stop_use_wicks: true,
            stop_initial_direction: StopDirection::Long,
            t3_fast_length: 12,
            t3_slow_length: 25,
            t3_factor: 0.7,
            confidence_threshold: 0.6,
        }
    }
}

/// A single value in a flat `name -> value` parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl ParamValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            // Whole floats are accepted for length parameters ("22.0").
            Self::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                serde_json::Value::from(*f as i64)
            }
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl StrategyParams {
    /// Check every parameter. Lengths must be >= 1, weights and multipliers
    /// finite and positive, and the thresholds inside their ranges.
    pub fn validate(&self) -> Result<(), SignalError> {
        QuantumMa::new(
            self.baseline_adx_length,
            self.baseline_weight,
            self.baseline_ma_length,
        )?;
        WavePulse::new(self.wave_smooth_period, self.wave_constant_factor)?;
        QuantumChannel::new(
            self.channel_source,
            self.channel_poles,
            self.channel_period,
            self.channel_multiplier,
        )?;
        MomentumDensity::new(
            self.density_ma_length,
            self.density_calc_length,
            self.density_smooth_length,
        )?;
        RatchetStop::new(
            self.stop_atr_length,
            self.stop_atr_multiplier,
            self.stop_use_wicks,
            self.stop_initial_direction,
        )?;
        T3Pair::new(self.t3_fast_length, self.t3_slow_length, self.t3_factor)?;

        if !(0.0..=100.0).contains(&self.density_threshold) {
            return Err(SignalError::invalid(
                "density_threshold",
                format!("must be in [0, 100], got {}", self.density_threshold),
            ));
        }
        if !(0.5..=1.0).contains(&self.confidence_threshold) {
            return Err(SignalError::invalid(
                "confidence_threshold",
                format!("must be in [0.5, 1.0], got {}", self.confidence_threshold),
            ));
        }
        Ok(())
    }

    /// Parse and validate a flat TOML table. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, SignalError> {
        let params: Self =
            toml::from_str(s).map_err(|e| SignalError::invalid("params", e.message()))?;
        params.validate()?;
        Ok(params)
    }

    /// Build from a flat `name -> value` map. Unknown names are rejected.
    pub fn from_map(map: &BTreeMap<String, ParamValue>) -> Result<Self, SignalError> {
        let object: serde_json::Map<String, serde_json::Value> = map
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        let params: Self = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| SignalError::invalid("params", e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Content hash of the canonical JSON form (blake3, hex).
    ///
    /// Field order is fixed by the struct, so equal tables hash equally.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("StrategyParams must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Bars needed before `evaluate` can produce a decision: the stop needs
    /// `stop_atr_length` bars to seed, fusion needs one bar more.
    pub fn warmup_bars(&self) -> usize {
        self.stop_atr_length + 1
    }
}
