//! The signal engine: validated parameters, an optional predictor, and the
//! batch entry points built on `SignalStream`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::Bar;
use crate::error::SignalError;
use crate::params::StrategyParams;
use crate::predictor::{Predictor, PredictorOutput};

use super::frame::IndicatorFrame;
use super::fusion::SignalDecision;
use super::state::IndicatorState;
use super::stream::SignalStream;

#[derive(Clone)]
pub struct SignalEngine {
    params: StrategyParams,
    /// Fresh state built from `params`; every evaluation starts from a clone.
    initial: IndicatorState,
    predictor: Option<Arc<dyn Predictor>>,
}

impl fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEngine")
            .field("params", &self.params)
            .field("predictor", &self.predictor.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl SignalEngine {
    /// Validates every parameter; construction is the only place
    /// `InvalidParameter` can come from.
    pub fn new(params: StrategyParams) -> Result<Self, SignalError> {
        params.validate()?;
        let initial = IndicatorState::new(&params)?;
        Ok(Self {
            params,
            initial,
            predictor: None,
        })
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn predictor(&self) -> Option<&Arc<dyn Predictor>> {
        self.predictor.as_ref()
    }

    /// A fresh stream sharing this engine's parameters.
    pub fn stream(&self) -> SignalStream {
        SignalStream::new(
            self.initial.clone(),
            self.params.density_threshold,
            self.params.confidence_threshold,
            self.params.warmup_bars(),
        )
    }

    /// Indicator frames for every bar of `history`.
    pub fn frames(&self, history: &[Bar]) -> Vec<IndicatorFrame> {
        let mut state = self.initial.clone();
        history.iter().map(|bar| state.update(bar)).collect()
    }

    /// Ask the predictor about `history`. Failures and invalid outputs are
    /// logged and reported as "no prediction".
    pub fn predict(&self, history: &[Bar]) -> Option<PredictorOutput> {
        let predictor = self.predictor.as_ref()?;
        match predictor.predict(history) {
            Ok(output) => match output.check() {
                Ok(()) => Some(output),
                Err(e) => {
                    warn!(predictor = predictor.name(), error = %e, "discarding predictor output");
                    None
                }
            },
            Err(e) => {
                warn!(predictor = predictor.name(), error = %e, "predictor unavailable");
                None
            }
        }
    }

    /// Decision for the last bar of `history`.
    ///
    /// Pure in `history`: the same prefix always yields the same decision.
    pub fn evaluate(&self, history: &[Bar]) -> Result<SignalDecision, SignalError> {
        let required = self.params.warmup_bars();
        if history.len() < required {
            return Err(SignalError::InsufficientHistory {
                required,
                available: history.len(),
            });
        }

        let mut stream = self.stream();
        for bar in history {
            stream.push(bar);
        }
        let prediction = self.predict(history);
        let decision = stream.decide(prediction.as_ref())?;

        debug!(
            timestamp = %decision.timestamp,
            bars = history.len(),
            long_entry = decision.long_entry,
            short_entry = decision.short_entry,
            long_exit = decision.long_exit,
            short_exit = decision.short_exit,
            vetoed = decision.was_vetoed(),
            "evaluated"
        );
        Ok(decision)
    }
}
