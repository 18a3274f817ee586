//! Recurrence indicators.
//!
//! Every indicator is built from a streaming state (`update` one bar at a
//! time) so that batch evaluation is just a fold over the same step function.
//! Single-series indicators also implement `Indicator`, which precomputes a
//! full series with `f64::NAN` during warmup.

pub mod atr;
pub mod ema;
pub mod momentum_density;
pub mod pole_filter;
pub mod quantum_channel;
pub mod quantum_ma;
pub mod ratchet_stop;
pub mod rolling;
pub mod t3;
pub mod tillson;
pub mod wave_pulse;

pub use atr::{true_range, Atr, AtrState, TrueRangeState};
pub use ema::{cascade_ema, ema, ema_alpha, CascadeState, EmaState};
pub use momentum_density::{MomentumDensity, MomentumDensityState};
pub use pole_filter::{n_pole_filter, PoleFilterState};
pub use quantum_channel::{
    channel_alpha, ChannelBand, ChannelBands, PriceSource, QuantumChannel, QuantumChannelState,
};
pub use quantum_ma::{QuantumMa, QuantumMaState};
pub use ratchet_stop::{RatchetStop, RatchetStopState, StopDirection, StopLevels};
pub use rolling::RollingWindow;
pub use t3::{T3Pair, T3PairState, T3Values, T3};
pub use tillson::{TillsonCoefficients, TillsonState};
pub use wave_pulse::{WavePulse, WavePulseState};

use crate::domain::Bar;

/// Trait for single-series indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. Values that are still warming up are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "wave_pulse_21_0.4").
    fn name(&self) -> &str;

    /// Number of bars before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar::new(test_timestamp(i), open, high, low, close, 1000.0)
        })
        .collect()
}

/// Build bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new(test_timestamp(i), open, high, low, close, 1000.0)
        })
        .collect()
}

#[cfg(test)]
fn test_timestamp(i: usize) -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
