//! Six-stage Tillson smoother shared by WavePulse and T3.
//!
//! e1..e6 are cascaded EMAs of the input; the output is
//! c1*e6 + c2*e5 + c3*e4 + c4*e3 with cubic coefficients of the volume
//! factor `c`. The coefficients always sum to 1.

use super::ema::CascadeState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TillsonCoefficients {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
}

impl TillsonCoefficients {
    pub fn new(factor: f64) -> Self {
        let c = factor;
        let c2 = c * c;
        let c3 = c2 * c;
        Self {
            c1: -c3,
            c2: 3.0 * (c2 + c3),
            c3: -3.0 * (2.0 * c2 + c + c3),
            c4: 3.0 * c + 1.0 + c3 + 3.0 * c2,
        }
    }

    fn combine(&self, e3: f64, e4: f64, e5: f64, e6: f64) -> f64 {
        self.c1 * e6 + self.c2 * e5 + self.c3 * e4 + self.c4 * e3
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TillsonState {
    cascade: CascadeState,
    coefficients: TillsonCoefficients,
}

impl TillsonState {
    pub fn new(alpha: f64, factor: f64) -> Self {
        Self {
            cascade: CascadeState::new(alpha, 6),
            coefficients: TillsonCoefficients::new(factor),
        }
    }

    pub fn update(&mut self, x: f64) -> Option<f64> {
        let e = self.cascade.update(x)?;
        Some(self.coefficients.combine(e[2], e[3], e[4], e[5]))
    }

    pub fn reset(&mut self) {
        self.cascade.reset();
    }
}
