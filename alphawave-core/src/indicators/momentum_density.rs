//! Momentum Density — participation gate in [0, 100].
//!
//! bound = mean(close, ma_length) - 0.2 * std(close, ma_length)
//! raw   = count(close > bound over the last calc_length bars) * 100 / calc_length
//! out   = ema(raw, smooth_length)
//!
//! A window holding fewer than two closes has std 0. The count is always
//! divided by the full `calc_length`, so the gate stays low during warmup.

use crate::domain::Bar;
use crate::error::{require_length, SignalError};

use super::ema::EmaState;
use super::rolling::RollingWindow;
use super::Indicator;

const STD_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct MomentumDensity {
    ma_length: usize,
    calc_length: usize,
    smooth_length: usize,
    name: String,
}

impl MomentumDensity {
    pub fn new(
        ma_length: usize,
        calc_length: usize,
        smooth_length: usize,
    ) -> Result<Self, SignalError> {
        require_length("density_ma_length", ma_length)?;
        require_length("density_calc_length", calc_length)?;
        require_length("density_smooth_length", smooth_length)?;
        Ok(Self {
            ma_length,
            calc_length,
            smooth_length,
            name: format!("momentum_density_{ma_length}_{calc_length}_{smooth_length}"),
        })
    }

    pub fn state(&self) -> MomentumDensityState {
        MomentumDensityState {
            closes: RollingWindow::new(self.ma_length),
            above: RollingWindow::new(self.calc_length),
            smooth: EmaState::with_span(self.smooth_length),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumDensityState {
    closes: RollingWindow,
    above: RollingWindow,
    smooth: EmaState,
}

impl MomentumDensityState {
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        if bar.close.is_nan() {
            return self.smooth.value();
        }
        self.closes.push(bar.close);
        let mean = self.closes.mean()?;
        let bound = mean - STD_WEIGHT * self.closes.std().unwrap_or(0.0);

        self.above.push(if bar.close > bound { 1.0 } else { 0.0 });
        let raw = self.above.sum() * 100.0 / self.above.period() as f64;
        self.smooth.update(raw)
    }

    pub fn reset(&mut self) {
        self.closes.clear();
        self.above.clear();
        self.smooth.reset();
    }
}

impl Indicator for MomentumDensity {
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
