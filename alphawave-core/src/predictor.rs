//! External predictor contract.
//!
//! A predictor looks at a bar history prefix and reports a direction with a
//! confidence in [0, 1]. The engine only consumes this contract; training and
//! feature engineering live behind it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorDirection {
    Up,
    Down,
    #[default]
    None,
}

impl PredictorDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::None => "none",
        }
    }
}

impl fmt::Display for PredictorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictorDirection {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "long" | "buy" => Ok(Self::Up),
            "down" | "short" | "sell" => Ok(Self::Down),
            "none" | "flat" | "" => Ok(Self::None),
            other => Err(PredictorError::InvalidOutput(format!(
                "unknown direction `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictorOutput {
    pub direction: PredictorDirection,
    pub confidence: f64,
}

impl PredictorOutput {
    /// Rejects confidences outside [0, 1] (NaN included).
    pub fn new(direction: PredictorDirection, confidence: f64) -> Result<Self, PredictorError> {
        let output = Self {
            direction,
            confidence,
        };
        output.check()?;
        Ok(output)
    }

    pub fn up(confidence: f64) -> Result<Self, PredictorError> {
        Self::new(PredictorDirection::Up, confidence)
    }

    pub fn down(confidence: f64) -> Result<Self, PredictorError> {
        Self::new(PredictorDirection::Down, confidence)
    }

    /// Public fields let adapters build an output directly; fusion re-checks.
    pub fn check(&self) -> Result<(), PredictorError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(PredictorError::InvalidOutput(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    #[error("predictor has not been trained")]
    NotTrained,

    #[error("no prediction available: {0}")]
    Unavailable(String),

    #[error("invalid predictor output: {0}")]
    InvalidOutput(String),

    #[error("predictor failed: {0}")]
    Failed(String),
}

/// Capability interface for any model that produces a directional call.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    /// Predict the next move from `history` (oldest first, latest bar last).
    fn predict(&self, history: &[Bar]) -> Result<PredictorOutput, PredictorError>;
}
