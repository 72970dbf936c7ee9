//! Error types for invariant and index operations

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the invariant data model.
///
/// All of these are contract violations: they are never defaulted to a
/// sentinel value and always propagate to the caller of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A variable name is absent from the index it was looked up in
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A position outside `[0, size)` was looked up
    #[error("index {index} out of range for variable index of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Evaluation or encoding of an invariant whose right-hand side is unknown
    #[error("invariant has an unknown constant: {0}")]
    UnknownConstant(String),

    /// Text that is not a well-formed persisted equation
    #[error("invalid equation '{text}': {reason}")]
    InvalidEquation { text: String, reason: String },
}

impl Error {
    pub fn invalid_equation(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidEquation {
            text: text.into(),
            reason: reason.into(),
        }
    }
}
