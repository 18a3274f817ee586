//! Signal engine — per-bar indicator frames, rule fusion, predictor veto.
//!
//! Data flows one way: bar -> `IndicatorState::update` -> `IndicatorFrame`
//! -> `fuse` -> `SignalDecision`. Batch evaluation is a fold of the same
//! streaming step, so both paths produce identical frames.

pub mod frame;
pub mod fusion;
pub mod signal_engine;
pub mod state;
pub mod stream;

pub use frame::{DefinedFrame, IndicatorFrame};
pub use fusion::{
    apply_veto, entry_conditions, evaluate_rules, fuse, EntryConditions, RuleSignal,
    SignalDecision,
};
pub use signal_engine::SignalEngine;
pub use state::IndicatorState;
pub use stream::SignalStream;
