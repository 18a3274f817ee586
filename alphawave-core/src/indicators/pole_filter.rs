//! N-pole chained low-pass filter.
//!
//! Each pole runs y[t] = alpha * x[t] + (1 - alpha) * y[t-1] where the input
//! of pole k is the output of pole k-1 on the same bar. Every pole keeps its
//! own previous value and is seeded by the first defined input it sees.

use crate::error::SignalError;

#[derive(Debug, Clone, PartialEq)]
pub struct PoleFilterState {
    alpha: f64,
    poles: Vec<Option<f64>>,
}

impl PoleFilterState {
    pub fn new(alpha: f64, poles: usize) -> Result<Self, SignalError> {
        if poles == 0 {
            return Err(SignalError::invalid("poles", "must be >= 1"));
        }
        if alpha.is_nan() {
            return Err(SignalError::invalid("alpha", "must not be NaN"));
        }
        Ok(Self {
            alpha,
            poles: vec![None; poles],
        })
    }

    pub fn update(&mut self, x: f64) -> Option<f64> {
        if x.is_nan() {
            return self.value();
        }
        let mut input = x;
        for pole in self.poles.iter_mut() {
            let y = match *pole {
                None => input,
                Some(prev) => self.alpha * input + (1.0 - self.alpha) * prev,
            };
            *pole = Some(y);
            input = y;
        }
        Some(input)
    }

    /// Output of the last pole.
    pub fn value(&self) -> Option<f64> {
        self.poles.last().copied().flatten()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.poles.iter_mut().for_each(|p| *p = None);
    }
}

/// Filter a whole series.
///
/// Leading NaN outputs (inputs before the first defined value) are back-filled
/// with the first defined output, so the result only contains NaN when the
/// series has no defined value at all.
pub fn n_pole_filter(series: &[f64], alpha: f64, poles: usize) -> Result<Vec<f64>, SignalError> {
    let mut state = PoleFilterState::new(alpha, poles)?;
    let mut out: Vec<f64> = series
        .iter()
        .map(|&x| state.update(x).unwrap_or(f64::NAN))
        .collect();

    if let Some(first) = out.iter().position(|v| !v.is_nan()) {
        let seed = out[first];
        out[..first].iter_mut().for_each(|v| *v = seed);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, ema_alpha, DEFAULT_EPSILON};

    #[test]
    fn rejects_zero_poles_and_nan_alpha() {
        assert!(matches!(
            n_pole_filter(&[1.0], 0.5, 0),
            Err(SignalError::InvalidParameter { .. })
        ));
        assert!(matches!(
            n_pole_filter(&[1.0], f64::NAN, 2),
            Err(SignalError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn one_pole_is_an_ema() {
        let series = [5.0, 7.0, 6.0, 9.0, 12.0];
        let filtered = n_pole_filter(&series, 0.3, 1).unwrap();
        let reference = ema_alpha(&series, 0.3);
        for (a, b) in filtered.iter().zip(reference.iter()) {
            assert_approx(*a, *b, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn poles_are_chained() {
        // alpha 0.5, input 0 then 8:
        // pole1: 0, 4 ; pole2: 0, 2 ; pole3: 0, 1
        let filtered = n_pole_filter(&[0.0, 8.0], 0.5, 3).unwrap();
        assert_approx(filtered[0], 0.0, DEFAULT_EPSILON);
        assert_approx(filtered[1], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_nan_is_backfilled() {
        let filtered = n_pole_filter(&[f64::NAN, f64::NAN, 4.0, 6.0], 0.5, 2).unwrap();
        assert_approx(filtered[0], 4.0, DEFAULT_EPSILON);
        assert_approx(filtered[1], 4.0, DEFAULT_EPSILON);
        assert_approx(filtered[2], 4.0, DEFAULT_EPSILON);
        // pole1: 5, pole2: 0.5*5 + 0.5*4 = 4.5
        assert_approx(filtered[3], 4.5, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_input_stays_constant() {
        let filtered = n_pole_filter(&[3.0; 20], 0.1, 4).unwrap();
        assert!(filtered.iter().all(|v| (*v - 3.0).abs() < DEFAULT_EPSILON));
    }
}
