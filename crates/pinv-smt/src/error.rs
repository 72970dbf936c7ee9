//! Error types for solver-backed checks

use thiserror::Error;

/// Result type alias for solver-backed checks
pub type CheckResult<T> = std::result::Result<T, CheckError>;

/// Errors that can occur while encoding or checking invariant sets
#[derive(Debug, Error)]
pub enum CheckError {
    /// Contract violation in the invariant data model
    #[error(transparent)]
    Core(#[from] pinv_core::Error),

    /// The solver answered neither sat nor unsat (timeout, incompleteness)
    #[error("solver inconclusive: {reason}")]
    SolverInconclusive { reason: String },

    /// Model extraction error
    #[error("failed to extract model: {0}")]
    ModelError(String),

    /// Checker configuration that cannot be honoured (e.g. worker pool)
    #[error("invalid checker configuration: {0}")]
    InvalidConfig(String),
}

impl CheckError {
    pub fn inconclusive(reason: impl Into<String>) -> Self {
        CheckError::SolverInconclusive {
            reason: reason.into(),
        }
    }
}
