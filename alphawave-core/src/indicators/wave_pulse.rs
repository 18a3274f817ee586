//! WavePulse — low-lag momentum line.
//!
//! alpha = 2 / ((smooth_period - 1) / 2 + 2), six cascaded EMAs of close,
//! combined with the Tillson cubic coefficients of `constant_factor`.
//! Defined from the first bar.

use crate::domain::Bar;
use crate::error::{require_length, SignalError};

use super::tillson::TillsonState;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct WavePulse {
    smooth_period: usize,
    constant_factor: f64,
    name: String,
}

impl WavePulse {
    pub fn new(smooth_period: usize, constant_factor: f64) -> Result<Self, SignalError> {
        require_length("wave_smooth_period", smooth_period)?;
        if !(constant_factor > 0.0 && constant_factor < 1.0) {
            return Err(SignalError::invalid(
                "wave_constant_factor",
                format!("must be in (0, 1), got {constant_factor}"),
            ));
        }
        Ok(Self {
            smooth_period,
            constant_factor,
            name: format!("wave_pulse_{smooth_period}_{constant_factor}"),
        })
    }

    pub fn alpha(&self) -> f64 {
        2.0 / ((self.smooth_period as f64 - 1.0) / 2.0 + 2.0)
    }

    pub fn state(&self) -> WavePulseState {
        WavePulseState {
            inner: TillsonState::new(self.alpha(), self.constant_factor),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WavePulseState {
    inner: TillsonState,
}

impl WavePulseState {
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.inner.update(bar.close)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Indicator for WavePulse {
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
