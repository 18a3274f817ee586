//! Tillson T3 moving average and the fast/slow T3 pair.
//!
//! Each T3 is six EMAs of close with alpha = 2 / (length + 1) combined with
//! the Tillson cubic coefficients of `factor`. The pair's difference
//! (fast - slow) is a slow trend confirmation.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::{require_length, require_positive, SignalError};

use super::ema::span_alpha;
use super::tillson::TillsonState;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct T3 {
    length: usize,
    factor: f64,
    name: String,
}

impl T3 {
    pub fn new(length: usize, factor: f64) -> Result<Self, SignalError> {
        require_length("t3_length", length)?;
        require_positive("t3_factor", factor)?;
        Ok(Self {
            length,
            factor,
            name: format!("t3_{length}_{factor}"),
        })
    }

    pub fn state(&self) -> TillsonState {
        TillsonState::new(span_alpha(self.length), self.factor)
    }
}

impl Indicator for T3 {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut state = self.state();
        bars.iter()
            .map(|bar| state.update(bar.close).unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct T3Values {
    pub fast: f64,
    pub slow: f64,
    pub diff: f64,
}

#[derive(Debug, Clone)]
pub struct T3Pair {
    fast: T3,
    slow: T3,
}

impl T3Pair {
    pub fn new(fast_length: usize, slow_length: usize, factor: f64) -> Result<Self, SignalError> {
        require_length("t3_fast_length", fast_length)?;
        require_length("t3_slow_length", slow_length)?;
        Ok(Self {
            fast: T3::new(fast_length, factor)?,
            slow: T3::new(slow_length, factor)?,
        })
    }

    pub fn state(&self) -> T3PairState {
        T3PairState {
            fast: self.fast.state(),
            slow: self.slow.state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct T3PairState {
    fast: TillsonState,
    slow: TillsonState,
}

impl T3PairState {
    pub fn update(&mut self, bar: &Bar) -> Option<T3Values> {
        let fast = self.fast.update(bar.close)?;
        let slow = self.slow.update(bar.close)?;
        Some(T3Values {
            fast,
            slow,
            diff: fast - slow,
        })
    }

    pub fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn t3_first_value_is_first_close() {
        let bars = make_bars(&[50.0, 51.0]);
        let out = T3::new(12, 0.7).unwrap().compute(&bars);
        assert_approx(out[0], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn t3_rejects_bad_params() {
        assert!(T3::new(0, 0.7).is_err());
        assert!(T3::new(12, 0.0).is_err());
        assert!(T3Pair::new(12, 0, 0.7).is_err());
    }

    #[test]
    fn pair_diff_is_fast_minus_slow() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let bars = make_bars(&closes);
        let mut state = T3Pair::new(12, 25, 0.7).unwrap().state();
        for bar in &bars {
            let v = state.update(bar).unwrap();
            assert_approx(v.diff, v.fast - v.slow, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn fast_leads_slow_in_uptrend() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + 0.5 * i as f64).collect();
        let bars = make_bars(&closes);
        let mut state = T3Pair::new(12, 25, 0.7).unwrap().state();
        let mut last = None;
        for bar in &bars {
            last = state.update(bar);
        }
        let v = last.unwrap();
        assert!(v.fast < closes[199]);
        assert!(v.slow < v.fast);
        assert!(v.diff > 0.0);
    }
}
