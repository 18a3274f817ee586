//! Criterion benchmarks for the AlphaWave hot paths.
//!
//! 1. Individual indicator folds over a long history
//! 2. Full frame pipeline (all indicators, one instrument)
//! 3. Streaming push + decide per bar
//! 4. `evaluate` on growing prefixes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use alphawave_core::indicators::{
    Indicator, MomentumDensity, PriceSource, QuantumChannel, QuantumMa, RatchetStop,
    StopDirection, T3Pair, WavePulse,
};
use alphawave_core::{Bar, SignalEngine, StrategyParams};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2015, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            Bar::new(
                base + chrono::Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let bars = make_bars(5_000);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(QuantumMa::new(2, 10.0, 6).unwrap()),
        Box::new(WavePulse::new(21, 0.4).unwrap()),
        Box::new(QuantumChannel::new(PriceSource::Hlc3, 4, 144, 1.414).unwrap()),
        Box::new(MomentumDensity::new(100, 60, 3).unwrap()),
        Box::new(RatchetStop::new(22, 3.0, true, StopDirection::Long).unwrap()),
    ];

    let mut group = c.benchmark_group("indicators");
    for indicator in &indicators {
        group.bench_function(indicator.name(), |b| {
            b.iter(|| indicator.compute(black_box(&bars)))
        });
    }
    let t3 = T3Pair::new(12, 25, 0.7).unwrap();
    group.bench_function("t3_pair", |b| {
        b.iter(|| {
            let mut state = t3.state();
            for bar in black_box(&bars) {
                black_box(state.update(bar));
            }
        })
    });
    group.finish();
}

// ── 2. Frame pipeline ────────────────────────────────────────────────

fn bench_frames(c: &mut Criterion) {
    let engine = SignalEngine::new(StrategyParams::default()).unwrap();
    let mut group = c.benchmark_group("frames");
    for n in [500, 2_500, 10_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| engine.frames(black_box(bars)))
        });
    }
    group.finish();
}

// ── 3. Streaming ─────────────────────────────────────────────────────

fn bench_stream(c: &mut Criterion) {
    let engine = SignalEngine::new(StrategyParams::default()).unwrap();
    let bars = make_bars(5_000);
    c.bench_function("stream_push_decide_5000", |b| {
        b.iter(|| {
            let mut stream = engine.stream();
            for bar in &bars {
                stream.push(black_box(bar));
                let _ = black_box(stream.decide(None));
            }
        })
    });
}

// ── 4. Evaluate ──────────────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let engine = SignalEngine::new(StrategyParams::default()).unwrap();
    let bars = make_bars(2_000);
    c.bench_function("evaluate_2000", |b| {
        b.iter(|| engine.evaluate(black_box(&bars)))
    });
}

criterion_group!(
    benches,
    bench_indicators,
    bench_frames,
    bench_stream,
    bench_evaluate
);
criterion_main!(benches);
