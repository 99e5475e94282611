//! Search pattern errors.

use thiserror::Error;

/// A user-supplied search pattern failed to compile.
///
/// Absorbed by text indexing; callers observe a zero count.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid pattern '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl PatternError {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
