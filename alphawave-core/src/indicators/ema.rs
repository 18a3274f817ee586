//! Exponential smoothing primitives.
//!
//! Recursive: y[t] = alpha * x[t] + (1 - alpha) * y[t-1], seeded with the
//! first finite input (y[0] = x[0]). NaN inputs are skipped: the state
//! carries forward and the previous value is reported again.

/// Single-pole exponential smoother.
#[derive(Debug, Clone, PartialEq)]
pub struct EmaState {
    alpha: f64,
    value: Option<f64>,
}

impl EmaState {
    pub fn new(alpha: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&alpha), "EMA alpha must be in [0, 1]");
        Self { alpha, value: None }
    }

    /// Span form: alpha = 2 / (span + 1).
    pub fn with_span(span: usize) -> Self {
        Self::new(span_alpha(span))
    }

    pub fn update(&mut self, x: f64) -> Option<f64> {
        if x.is_nan() {
            return self.value;
        }
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// `stages` EMAs in series; stage k is fed by the output of stage k-1.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeState {
    stages: Vec<EmaState>,
    outputs: Vec<f64>,
}

impl CascadeState {
    pub fn new(alpha: f64, stages: usize) -> Self {
        Self {
            stages: vec![EmaState::new(alpha); stages],
            outputs: vec![f64::NAN; stages],
        }
    }

    /// Feed one value; returns every stage's output, first stage first.
    pub fn update(&mut self, x: f64) -> Option<&[f64]> {
        let mut input = x;
        for (stage, out) in self.stages.iter_mut().zip(self.outputs.iter_mut()) {
            *out = stage.update(input)?;
            input = *out;
        }
        Some(&self.outputs)
    }

    pub fn reset(&mut self) {
        self.stages.iter_mut().for_each(EmaState::reset);
        self.outputs.iter_mut().for_each(|v| *v = f64::NAN);
    }
}

pub(crate) fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA of an arbitrary series with alpha = 2 / (span + 1).
///
/// Returns all NaN for `span == 0`.
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; series.len()];
    }
    ema_alpha(series, span_alpha(span))
}

/// EMA of an arbitrary series with an explicit alpha.
pub fn ema_alpha(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut state = EmaState::new(alpha);
    series
        .iter()
        .map(|&x| state.update(x).unwrap_or(f64::NAN))
        .collect()
}

/// `stages` sequential EMA passes; returns the output of the last pass.
pub fn cascade_ema(series: &[f64], span: usize, stages: usize) -> Vec<f64> {
    if span == 0 || stages == 0 {
        return vec![f64::NAN; series.len()];
    }
    let mut state = CascadeState::new(span_alpha(span), stages);
    series
        .iter()
        .map(|&x| {
            state
                .update(x)
                .and_then(|outs| outs.last().copied())
                .unwrap_or(f64::NAN)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_input() {
        let out = ema(&[100.0, 200.0, 300.0], 1);
        assert_eq!(out, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed = first value
        // y = 10, 0.5*11+0.5*10 = 10.5, 0.5*12+0.5*10.5 = 11.25
        let out = ema(&[10.0, 11.0, 12.0], 3);
        assert_approx(out[0], 10.0, DEFAULT_EPSILON);
        assert_approx(out[1], 10.5, DEFAULT_EPSILON);
        assert_approx(out[2], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_skips_leading_and_inner_nan() {
        let out = ema(&[f64::NAN, 10.0, f64::NAN, 12.0], 3);
        assert!(out[0].is_nan());
        assert_approx(out[1], 10.0, DEFAULT_EPSILON);
        // NaN holds the previous value
        assert_approx(out[2], 10.0, DEFAULT_EPSILON);
        assert_approx(out[3], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_zero_span_is_all_nan() {
        assert!(ema(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cascade_of_one_stage_matches_ema() {
        let series = [3.0, 4.0, 8.0, 1.0, 5.0];
        assert_eq!(cascade_ema(&series, 4, 1), ema(&series, 4));
    }

    #[test]
    fn cascade_two_stages_is_ema_of_ema() {
        let series = [3.0, 4.0, 8.0, 1.0, 5.0, 9.0];
        let twice = ema(&ema(&series, 5), 5);
        let cascade = cascade_ema(&series, 5, 2);
        for (a, b) in cascade.iter().zip(twice.iter()) {
            assert_approx(*a, *b, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn cascade_state_reports_every_stage() {
        let mut state = CascadeState::new(0.5, 3);
        let outs = state.update(10.0).unwrap().to_vec();
        assert_eq!(outs, vec![10.0, 10.0, 10.0]);
        let outs = state.update(14.0).unwrap().to_vec();
        // 12, then 0.5*12+0.5*10 = 11, then 0.5*11+0.5*10 = 10.5
        assert_eq!(outs, vec![12.0, 11.0, 10.5]);
    }

    #[test]
    fn reset_forgets_the_seed() {
        let mut state = EmaState::with_span(3);
        state.update(10.0);
        state.update(20.0);
        state.reset();
        assert_eq!(state.value(), None);
        assert_eq!(state.update(5.0), Some(5.0));
    }
}
