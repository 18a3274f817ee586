//! Fixed-size rolling window with partial-window aggregates.
//!
//! Aggregates are defined as soon as one value has been pushed (the window
//! does not wait to be full); `is_full` tells callers when it is.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "rolling window period must be >= 1");
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.period {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.sum() / self.values.len() as f64)
    }

    /// Sample standard deviation (n - 1 denominator). `None` below two values.
    pub fn std(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let mean = self.sum() / n as f64;
        let ss: f64 = self.values.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn partial_window_aggregates() {
        let mut w = RollingWindow::new(3);
        assert_eq!(w.mean(), None);
        w.push(2.0);
        assert_eq!(w.mean(), Some(2.0));
        assert_eq!(w.std(), None);
        assert!(!w.is_full());
    }

    #[test]
    fn window_drops_oldest_value() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 10.0] {
            w.push(v);
        }
        assert!(w.is_full());
        assert_eq!(w.sum(), 15.0);
        assert_eq!(w.min(), Some(2.0));
        assert_eq!(w.max(), Some(10.0));
    }

    #[test]
    fn sample_std() {
        let mut w = RollingWindow::new(4);
        for v in [2.0, 4.0, 4.0, 6.0] {
            w.push(v);
        }
        // mean 4, squared deviations 4+0+0+4 = 8, / 3
        assert_approx(w.std().unwrap(), (8.0_f64 / 3.0).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn constant_window_has_zero_std() {
        let mut w = RollingWindow::new(5);
        for _ in 0..5 {
            w.push(7.0);
        }
        assert_eq!(w.std(), Some(0.0));
    }
}
