//! End-to-end engine behavior on synthetic histories.
//!
//! Covers the documented scenarios: constant price, clean uptrend, the
//! 250-bar default-parameter run, idempotence, warmup errors, and the
//! streaming/batch and look-ahead equivalences.

use std::sync::Arc;

use chrono::NaiveDate;
use alphawave_core::indicators::StopDirection;
use alphawave_core::{
    Bar, BarHistory, Predictor, PredictorError, PredictorOutput, SignalEngine, SignalError,
    StrategyParams,
};

fn day(i: usize) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

/// Close rises 0.1 per bar, high/low = close +/- 0.5.
fn uptrend(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + 0.1 * i as f64;
            Bar::new(day(i), close - 0.1, close + 0.5, close - 0.5, close, 10_000.0)
        })
        .collect()
}

fn constant(n: usize, price: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar::new(day(i), price, price, price, price, 500.0))
        .collect()
}

/// Deterministic pseudo-random walk (LCG), wide enough to flip the stop.
fn choppy(n: usize) -> Vec<Bar> {
    let mut price = 100.0;
    let mut seed: u64 = 42;
    (0..n)
        .map(|i| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0;
            let swing = (i as f64 / 15.0).sin() * 1.5;
            let open = price;
            price = (price + change + swing).max(10.0);
            let high = open.max(price) + 0.8;
            let low = open.min(price) - 0.8;
            Bar::new(day(i), open, high, low, price, 1_000.0 + i as f64)
        })
        .collect()
}

fn engine() -> SignalEngine {
    SignalEngine::new(StrategyParams::default()).unwrap()
}

#[test]
fn constant_price_converges_and_never_flips() {
    let bars = constant(120, 42.0);
    let frames = engine().frames(&bars);
    for frame in frames.iter().skip(21) {
        let stop = frame.stop.expect("stop defined after atr warmup");
        assert_eq!(stop.atr, 0.0);
        assert_eq!(stop.long_stop, 42.0);
        assert_eq!(stop.short_stop, 42.0);
        assert_eq!(stop.direction, StopDirection::Long);
    }
    let decision = engine().evaluate(&bars).unwrap();
    assert!(!decision.has_entry());
}

#[test]
fn uptrend_baseline_and_t3_track_below_price() {
    let bars = uptrend(250);
    for frame in engine().frames(&bars).iter().skip(200) {
        let t3 = frame.t3.unwrap();
        assert!(frame.baseline.unwrap() < frame.close, "baseline at {}", frame.index);
        assert!(t3.fast < frame.close, "t3 fast at {}", frame.index);
        assert!(t3.slow < frame.close, "t3 slow at {}", frame.index);
    }
}

#[test]
fn default_uptrend_scenario_entries() {
    let bars = uptrend(250);
    let engine = engine();
    let mut stream = engine.stream();
    let mut long_entries = 0;
    let mut short_entries = 0;

    for (i, bar) in bars.iter().enumerate() {
        let frame = stream.push(bar);
        if i < 54 {
            assert!(frame.density.unwrap() <= 90.0, "gate open at bar {i}");
        }
        if let Ok(decision) = stream.decide(None) {
            if i < engine.params().density_calc_length {
                assert!(!decision.has_entry(), "entry during gate warmup at bar {i}");
            }
            long_entries += decision.long_entry as usize;
            short_entries += decision.short_entry as usize;
        }
    }
    assert!(long_entries <= 1);
    assert_eq!(short_entries, 0);
}

#[test]
fn evaluate_is_idempotent() {
    let bars = choppy(300);
    let engine = engine();
    let first = engine.evaluate(&bars).unwrap();
    let second = engine.evaluate(&bars).unwrap();
    assert_eq!(first, second);
}

#[test]
fn short_history_is_insufficient_not_negative() {
    let bars = uptrend(22);
    let err = engine().evaluate(&bars).unwrap_err();
    assert_eq!(
        err,
        SignalError::InsufficientHistory {
            required: 23,
            available: 22,
        }
    );
    assert!(err.is_recoverable());
    assert!(engine().evaluate(&uptrend(23)).is_ok());
}

#[test]
fn stream_reports_insufficient_history_during_warmup() {
    let engine = engine();
    let mut stream = engine.stream();
    for bar in uptrend(22).iter() {
        stream.push(bar);
        assert!(matches!(
            stream.decide(None),
            Err(SignalError::InsufficientHistory { .. })
        ));
    }
}

#[test]
fn streaming_matches_batch_frames() {
    let bars = choppy(260);
    let engine = engine();
    let batch = engine.frames(&bars);
    let mut stream = engine.stream();
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(stream.push(bar), &batch[i], "frame {i} differs");
    }
}

#[test]
fn prefix_frames_do_not_see_the_future() {
    let bars = choppy(240);
    let engine = engine();
    let full = engine.frames(&bars);
    let prefix = engine.frames(&bars[..120]);
    assert_eq!(prefix.as_slice(), &full[..120]);
}

#[test]
fn evaluate_equals_stream_decision_at_every_bar() {
    let bars = choppy(150);
    let engine = engine();
    let mut stream = engine.stream();
    for i in 0..bars.len() {
        stream.push(&bars[i]);
        assert_eq!(stream.decide(None), engine.evaluate(&bars[..=i]), "bar {i}");
    }
}

#[test]
fn reset_stream_replays_identically() {
    let bars = choppy(80);
    let engine = engine();
    let mut stream = engine.stream();
    let first: Vec<_> = bars.iter().map(|b| stream.push(b).clone()).collect();
    stream.reset();
    assert_eq!(stream.bars_seen(), 0);
    let second: Vec<_> = bars.iter().map(|b| stream.push(b).clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn bar_history_feeds_engine() {
    let mut history = BarHistory::new();
    for bar in uptrend(40) {
        history.push(bar).unwrap();
    }
    assert!(engine().evaluate(&history).is_ok());
    assert!(engine().evaluate(history.prefix(10)).is_err());
}

struct AlwaysUp;

impl Predictor for AlwaysUp {
    fn name(&self) -> &str {
        "always_up"
    }

    fn predict(&self, _history: &[Bar]) -> Result<PredictorOutput, PredictorError> {
        PredictorOutput::up(0.9)
    }
}

struct Untrained;

impl Predictor for Untrained {
    fn name(&self) -> &str {
        "untrained"
    }

    fn predict(&self, _history: &[Bar]) -> Result<PredictorOutput, PredictorError> {
        Err(PredictorError::NotTrained)
    }
}

#[test]
fn confident_up_predictor_removes_every_short_entry() {
    let bars = choppy(400);
    let plain = engine();
    let vetoed = engine().with_predictor(Arc::new(AlwaysUp));
    for end in 23..=bars.len() {
        let rule = plain.evaluate(&bars[..end]).unwrap();
        let fused = vetoed.evaluate(&bars[..end]).unwrap();
        assert!(!fused.short_entry);
        assert_eq!(fused.long_entry, rule.long_entry);
        assert_eq!(fused.rule, rule.rule);
    }
}

#[test]
fn untrained_predictor_degrades_to_rules() {
    let bars = choppy(200);
    let plain = engine().evaluate(&bars).unwrap();
    let with_untrained = engine()
        .with_predictor(Arc::new(Untrained))
        .evaluate(&bars)
        .unwrap();
    assert_eq!(plain, with_untrained);
}

#[test]
fn invalid_parameters_fail_fast() {
    for params in [
        StrategyParams {
            baseline_weight: 0.0,
            ..StrategyParams::default()
        },
        StrategyParams {
            density_calc_length: 0,
            ..StrategyParams::default()
        },
        StrategyParams {
            confidence_threshold: 0.3,
            ..StrategyParams::default()
        },
    ] {
        assert!(matches!(
            SignalEngine::new(params),
            Err(SignalError::InvalidParameter { .. })
        ));
    }
}
