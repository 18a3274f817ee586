//! Incremental evaluation: push one bar at a time, decide on the latest bar.

use crate::domain::Bar;
use crate::error::SignalError;
use crate::predictor::PredictorOutput;

use super::frame::IndicatorFrame;
use super::fusion::{fuse, SignalDecision};
use super::state::IndicatorState;

/// Streaming counterpart of `SignalEngine::evaluate`.
///
/// Keeps only the carried indicator state and the last two frames, so memory
/// does not grow with the history. Bars must be pushed in timestamp order.
#[derive(Debug, Clone)]
pub struct SignalStream {
    state: IndicatorState,
    density_threshold: f64,
    confidence_threshold: f64,
    warmup_bars: usize,
    prev: Option<IndicatorFrame>,
    current: Option<IndicatorFrame>,
}

impl SignalStream {
    pub(crate) fn new(
        state: IndicatorState,
        density_threshold: f64,
        confidence_threshold: f64,
        warmup_bars: usize,
    ) -> Self {
        Self {
            state,
            density_threshold,
            confidence_threshold,
            warmup_bars,
            prev: None,
            current: None,
        }
    }

    pub fn push(&mut self, bar: &Bar) -> &IndicatorFrame {
        let frame = self.state.update(bar);
        self.prev = self.current.take();
        self.current.insert(frame)
    }

    pub fn current(&self) -> Option<&IndicatorFrame> {
        self.current.as_ref()
    }

    pub fn bars_seen(&self) -> usize {
        self.state.bars_seen()
    }

    /// Fuse the last two frames. Undefined indicators surface as
    /// `InsufficientHistory`, never as a default decision.
    pub fn decide(&self, prediction: Option<&PredictorOutput>) -> Result<SignalDecision, SignalError> {
        let insufficient = || SignalError::InsufficientHistory {
            required: self.warmup_bars,
            available: self.bars_seen(),
        };
        let (Some(prev), Some(cur)) = (&self.prev, &self.current) else {
            return Err(insufficient());
        };
        let prev = prev.defined().map_err(|_| insufficient())?;
        let cur = cur.defined().map_err(|_| insufficient())?;
        Ok(fuse(
            &prev,
            &cur,
            prediction,
            self.density_threshold,
            self.confidence_threshold,
        ))
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.prev = None;
        self.current = None;
    }
}
