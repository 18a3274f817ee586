//! Engine error taxonomy.
//!
//! - `InvalidParameter` is fatal and raised at construction time.
//! - `InsufficientHistory` is recoverable: retry with more bars.
//! - `UndefinedIndicatorAccess` is raised when a warming-up value is read;
//!   the fusion layer converts it into `InsufficientHistory`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("indicator `{indicator}` is undefined at bar {bar_index}")]
    UndefinedIndicatorAccess {
        indicator: &'static str,
        bar_index: usize,
    },
}

impl SignalError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the caller should treat as "skip this bar and retry later".
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidParameter { .. })
    }
}

/// Reject zero lengths.
pub(crate) fn require_length(name: &str, value: usize) -> Result<usize, SignalError> {
    if value == 0 {
        return Err(SignalError::invalid(name, "must be >= 1"));
    }
    Ok(value)
}

/// Reject NaN, infinite and non-positive values.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64, SignalError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SignalError::invalid(
            name,
            format!("must be a finite value > 0, got {value}"),
        ));
    }
    Ok(value)
}
