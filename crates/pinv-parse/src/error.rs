//! Error types for tool output parsing

use thiserror::Error;

/// Result type alias for parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised on structurally malformed tool output.
///
/// A file that fails to parse yields no invariants at all; an empty but
/// well-formed file is not an error.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Line structure the format does not allow
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// A declared count disagrees with what the file contains
    #[error("expected {expected} {what}, found {actual}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An equation that does not decode
    #[error("line {line}: {source}")]
    Equation {
        line: usize,
        source: pinv_core::Error,
    },

    /// Unrecognized tool, mode or extension
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        ParseError::Malformed {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        ParseError::UnsupportedConfiguration(message.into())
    }
}
