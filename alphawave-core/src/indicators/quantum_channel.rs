//! Quantum Channel — N-pole filtered center line with true-range bands.
//!
//! beta  = (1 - cos(2*pi / period)) / (1.414^(2 / poles) - 1)
//! alpha = -beta + sqrt(beta^2 + 2*beta), or 0.01 if the radicand is negative
//!
//! center = n_pole_filter(source), half-width = n_pole_filter(true_range),
//! upper/lower = center +/- multiplier * half-width. Since true range is
//! non-negative, upper >= center >= lower on every bar.
//!
//! Three bands are exposed as separate Indicator instances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::{require_length, require_positive, SignalError};

use super::atr::TrueRangeState;
use super::pole_filter::PoleFilterState;
use super::Indicator;

const FALLBACK_ALPHA: f64 = 0.01;

/// Price projection used as the channel's source series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    Close,
    Hl2,
    #[default]
    Hlc3,
    Ohlc4,
}

impl PriceSource {
    pub fn value(self, bar: &Bar) -> f64 {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::Hl2 => bar.hl2(),
            Self::Hlc3 => bar.hlc3(),
            Self::Ohlc4 => bar.ohlc4(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Hl2 => "hl2",
            Self::Hlc3 => "hlc3",
            Self::Ohlc4 => "ohlc4",
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceSource {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "close" => Ok(Self::Close),
            "hl2" => Ok(Self::Hl2),
            "hlc3" => Ok(Self::Hlc3),
            "ohlc4" => Ok(Self::Ohlc4),
            other => Err(SignalError::invalid(
                "channel_source",
                format!("unknown source column `{other}`"),
            )),
        }
    }
}

/// Smoothing coefficient from the two-pole Butterworth damping term.
pub fn channel_alpha(poles: usize, period: usize) -> f64 {
    let denom = 1.414_f64.powf(2.0 / poles as f64) - 1.0;
    let beta = if poles > 0 && period > 0 && denom != 0.0 {
        (1.0 - (2.0 * std::f64::consts::PI / period as f64).cos()) / denom
    } else {
        1.0
    };
    let radicand = beta * beta + 2.0 * beta;
    if radicand >= 0.0 {
        -beta + radicand.sqrt()
    } else {
        FALLBACK_ALPHA
    }
}

/// Which line of the Quantum Channel to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBand {
    Upper,
    Center,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelBands {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct QuantumChannel {
    source: PriceSource,
    poles: usize,
    period: usize,
    multiplier: f64,
    filter: PoleFilterState,
    band: ChannelBand,
    name: String,
}

impl QuantumChannel {
    pub fn new(
        source: PriceSource,
        poles: usize,
        period: usize,
        multiplier: f64,
    ) -> Result<Self, SignalError> {
        require_length("channel_poles", poles)?;
        require_length("channel_period", period)?;
        require_positive("channel_multiplier", multiplier)?;
        let filter = PoleFilterState::new(channel_alpha(poles, period), poles)?;
        Ok(Self {
            source,
            poles,
            period,
            multiplier,
            filter,
            band: ChannelBand::Center,
            name: format!("quantum_channel_center_{source}_{poles}_{period}_{multiplier}"),
        })
    }

    /// Same as `new`, resolving the source by column name.
    pub fn with_source_name(
        source: &str,
        poles: usize,
        period: usize,
        multiplier: f64,
    ) -> Result<Self, SignalError> {
        Self::new(source.parse()?, poles, period, multiplier)
    }

    /// Select which band `Indicator::compute` returns.
    pub fn band(mut self, band: ChannelBand) -> Self {
        let label = match band {
            ChannelBand::Upper => "upper",
            ChannelBand::Center => "center",
            ChannelBand::Lower => "lower",
        };
        self.band = band;
        self.name = format!(
            "quantum_channel_{label}_{}_{}_{}_{}",
            self.source, self.poles, self.period, self.multiplier
        );
        self
    }

    pub fn alpha(&self) -> f64 {
        self.filter.alpha()
    }

    pub fn source(&self) -> PriceSource {
        self.source
    }

    pub fn state(&self) -> QuantumChannelState {
        QuantumChannelState {
            source: self.source,
            multiplier: self.multiplier,
            tr: TrueRangeState::new(),
            center: self.filter.clone(),
            width: self.filter.clone(),
        }
    }

    pub fn compute_bands(&self, bars: &[Bar]) -> Vec<Option<ChannelBands>> {
        let mut state = self.state();
        bars.iter().map(|bar| state.update(bar)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantumChannelState {
    source: PriceSource,
    multiplier: f64,
    tr: TrueRangeState,
    center: PoleFilterState,
    width: PoleFilterState,
}

impl QuantumChannelState {
    pub fn update(&mut self, bar: &Bar) -> Option<ChannelBands> {
        let tr = self.tr.update(bar);
        let center = self.center.update(self.source.value(bar));
        let width = self.width.update(tr);
        let (center, width) = (center?, width?);
        Some(ChannelBands {
            center,
            upper: center + width * self.multiplier,
            lower: center - width * self.multiplier,
        })
    }

    pub fn reset(&mut self) {
        self.tr.reset();
        self.center.reset();
        self.width.reset();
    }
}

impl Indicator for QuantumChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.compute_bands(bars)
            .into_iter()
            .map(|bands| match (bands, self.band) {
                (Some(b), ChannelBand::Upper) => b.upper,
                (Some(b), ChannelBand::Center) => b.center,
                (Some(b), ChannelBand::Lower) => b.lower,
                (None, _) => f64::NAN,
            })
            .collect()
    }
}
