//! Quantum-Adaptive MA — trend baseline with an ADX-driven smoothing constant.
//!
//! Steps per bar:
//! 1. Bull pressure = max(high - prev_high, 0), bear pressure =
//!    max(prev_low - low, 0); the dominant side keeps its value, the other is
//!    zeroed, ties zero both.
//! 2. Smooth both pressures and the high-low range with alpha = 1/(weight+1).
//! 3. Directional strength = |pos - neg| / (pos + neg) of the range-normalised
//!    pressures, smoothed again with the same alpha (0 on a zero range).
//! 4. k = min/max rescale of the strength over `adx_length` bars, in [0, 1].
//! 5. var_ma[t] = ((2 - k) * var_ma[t-1] + k * close) / 2, seeded with the
//!    first close.
//! 6. Output = rolling mean of var_ma over `ma_length`.
//!
//! Defined from the first bar with a finite close.

use crate::domain::Bar;
use crate::error::{require_length, require_positive, SignalError};

use super::ema::EmaState;
use super::rolling::RollingWindow;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct QuantumMa {
    adx_length: usize,
    weight: f64,
    ma_length: usize,
    name: String,
}

impl QuantumMa {
    pub fn new(adx_length: usize, weight: f64, ma_length: usize) -> Result<Self, SignalError> {
        require_length("baseline_adx_length", adx_length)?;
        require_positive("baseline_weight", weight)?;
        require_length("baseline_ma_length", ma_length)?;
        Ok(Self {
            adx_length,
            weight,
            ma_length,
            name: format!("quantum_ma_{adx_length}_{weight}_{ma_length}"),
        })
    }

    pub fn state(&self) -> QuantumMaState {
        let alpha = 1.0 / (self.weight + 1.0);
        QuantumMaState {
            prev_high_low: None,
            power_bulls: EmaState::new(alpha),
            power_bears: EmaState::new(alpha),
            range: EmaState::new(alpha),
            strength: EmaState::new(alpha),
            strength_window: RollingWindow::new(self.adx_length),
            var_ma: None,
            output_window: RollingWindow::new(self.ma_length),
            last_k: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantumMaState {
    prev_high_low: Option<(f64, f64)>,
    power_bulls: EmaState,
    power_bears: EmaState,
    range: EmaState,
    strength: EmaState,
    strength_window: RollingWindow,
    var_ma: Option<f64>,
    output_window: RollingWindow,
    last_k: f64,
}

impl QuantumMaState {
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        let (bulls, bears) = match self.prev_high_low {
            Some((prev_high, prev_low)) => dominant_pressure(
                (bar.high - prev_high).max(0.0),
                (prev_low - bar.low).max(0.0),
            ),
            None => (f64::NAN, f64::NAN),
        };
        self.prev_high_low = Some((bar.high, bar.low));

        let power_bulls = self.power_bulls.update(bulls);
        let power_bears = self.power_bears.update(bears);
        let range = self.range.update((bar.high - bar.low).abs());

        let ratio = match (power_bulls, power_bears, range) {
            (Some(pb), Some(pr), Some(r)) if r > 0.0 => {
                let pos = pb / r;
                let neg = pr / r;
                let sum = pos + neg;
                if sum > 0.0 {
                    (pos - neg).abs() / sum
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        let strength = self.strength.update(ratio).unwrap_or(0.0);
        self.strength_window.push(strength);
        let k = adaptive_constant(strength, &self.strength_window);
        self.last_k = k;

        let var_ma = match (self.var_ma, bar.close.is_nan()) {
            (None, true) => return None,
            (None, false) => bar.close,
            (Some(prev), true) => prev,
            (Some(prev), false) => ((2.0 - k) * prev + k * bar.close) / 2.0,
        };
        self.var_ma = Some(var_ma);
        self.output_window.push(var_ma);
        self.output_window.mean()
    }

    /// Smoothing constant used on the most recent bar.
    pub fn adaptive_constant(&self) -> f64 {
        self.last_k
    }

    pub fn reset(&mut self) {
        self.prev_high_low = None;
        self.power_bulls.reset();
        self.power_bears.reset();
        self.range.reset();
        self.strength.reset();
        self.strength_window.clear();
        self.var_ma = None;
        self.output_window.clear();
        self.last_k = 0.0;
    }
}

/// Keep only the dominant side; ties zero both.
fn dominant_pressure(up: f64, down: f64) -> (f64, f64) {
    if up > down {
        (up, 0.0)
    } else if down > up {
        (0.0, down)
    } else {
        (0.0, 0.0)
    }
}

/// Rescale `value` into [0, 1] against the window's min/max; 0 when flat.
fn adaptive_constant(value: f64, window: &RollingWindow) -> f64 {
    match (window.min(), window.max()) {
        (Some(lo), Some(hi)) if hi - lo > 0.0 => ((value - lo) / (hi - lo)).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

impl Indicator for QuantumMa {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut state = self.state();
        bars.iter()
            .map(|bar| state.update(bar).unwrap_or(f64::NAN))
            .collect()
    }
}
