//! AlphaWave Core — bar domain, recurrence indicators, and the signal engine.
//!
//! - Domain types (bars, append-only bar history)
//! - Recurrence primitives (EMA, cascades, N-pole filter, rolling windows, ATR)
//! - Indicators: quantum-adaptive baseline, WavePulse, quantum channel,
//!   momentum density, ratchet trailing stop, T3 pair
//! - Rule fusion with an external-predictor veto
//! - Strategy parameters with validation and fingerprinting
//!
//! Everything is pure computation over an in-memory bar sequence. One engine
//! (or stream) owns one instrument's state; instruments run in parallel.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod params;
pub mod predictor;

pub use domain::{Bar, BarError, BarHistory};
pub use engine::{IndicatorFrame, SignalDecision, SignalEngine, SignalStream};
pub use error::SignalError;
pub use params::{ParamValue, StrategyParams};
pub use predictor::{Predictor, PredictorDirection, PredictorError, PredictorOutput};
