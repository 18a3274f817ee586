//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! bar has no previous close and uses high-low alone.
//! ATR is the simple rolling mean of true range over `period` bars.
//! Lookback: period - 1.

use crate::domain::Bar;
use crate::error::{require_length, SignalError};

use super::rolling::RollingWindow;
use super::Indicator;

/// Streaming true range: remembers the previous close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrueRangeState {
    prev_close: Option<f64>,
}

impl TrueRangeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bar: &Bar) -> f64 {
        let hl = bar.high - bar.low;
        let tr = match self.prev_close {
            None => hl,
            Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
        };
        if !bar.close.is_nan() {
            self.prev_close = Some(bar.close);
        }
        tr
    }

    pub fn reset(&mut self) {
        self.prev_close = None;
    }
}

/// Compute the True Range series from bars.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut state = TrueRangeState::new();
    bars.iter().map(|bar| state.update(bar)).collect()
}

/// Streaming ATR. Undefined until `period` true ranges have been seen.
#[derive(Debug, Clone, PartialEq)]
pub struct AtrState {
    tr: TrueRangeState,
    window: RollingWindow,
}

impl AtrState {
    pub fn new(period: usize) -> Self {
        Self {
            tr: TrueRangeState::new(),
            window: RollingWindow::new(period),
        }
    }

    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        self.window.push(self.tr.update(bar));
        if self.window.is_full() {
            self.window.mean()
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.tr.reset();
        self.window.clear();
    }
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, SignalError> {
        require_length("atr_length", period)?;
        Ok(Self {
            period,
            name: format!("atr_{period}"),
        })
    }

    pub fn state(&self) -> AtrState {
        AtrState::new(self.period)
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut state = self.state();
        bars.iter()
            .map(|bar| state.update(bar).unwrap_or(f64::NAN))
            .collect()
    }
}
