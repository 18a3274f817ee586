//! Synthetic bar generation for demos, tests and benchmarks.
//!
//! Every generator is deterministic: the same arguments always produce the
//! same bars. Timestamps are consecutive calendar days, so the output can be
//! fed straight into `BarHistory::from_bars`.

use alphawave_core::Bar;
use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn day(start: NaiveDateTime, i: usize) -> NaiveDateTime {
    start + chrono::Duration::days(i as i64)
}

/// Default first timestamp for generated series.
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Stable 64-bit seed derived from a symbol name.
pub fn seed_for_symbol(symbol: &str) -> u64 {
    let hash = blake3::hash(symbol.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Multiplicative random walk from `start_price` with up to +/-3% daily moves.
pub fn random_walk(n: usize, start_price: f64, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = default_start();
    let mut price = start_price;

    let bars = (0..n).map(|i| {
        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();
        price = close;
        Bar::new(day(start, i), open, high, low, close, volume)
    });
    bars.collect()
}

/// Linear trend: close moves `step` per bar, high/low = close +/- `half_range`.
pub fn linear_trend(n: usize, start_price: f64, step: f64, half_range: f64) -> Vec<Bar> {
    let start = default_start();
    let bars = (0..n).map(|i| {
        let close = start_price + step * i as f64;
        let open = if i == 0 { close } else { close - step };
        Bar::new(
            day(start, i),
            open,
            close + half_range,
            close - half_range,
            close,
            10_000.0,
        )
    });
    bars.collect()
}

/// Constant-price bars (open = high = low = close).
pub fn flat(n: usize, price: f64) -> Vec<Bar> {
    let start = default_start();
    let bars = (0..n).map(|i| Bar::new(day(start, i), price, price, price, price, 1_000.0));
    bars.collect()
}

/// Sine wave around `center` with the given amplitude and period in bars.
pub fn sine_wave(n: usize, center: f64, amplitude: f64, period: f64) -> Vec<Bar> {
    let start = default_start();
    let bars = (0..n).map(|i| {
        let phase = std::f64::consts::TAU * i as f64 / period;
        let close = center + amplitude * phase.sin();
        let open = center + amplitude * (phase - std::f64::consts::TAU / period).sin();
        Bar::new(
            day(start, i),
            open,
            open.max(close) + amplitude * 0.05,
            open.min(close) - amplitude * 0.05,
            close,
            2_000.0,
        )
    });
    bars.collect()
}
