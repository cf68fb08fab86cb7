//! Error types for path compilation and evaluation

use thiserror::Error;

/// A path string could not be compiled
///
/// Carries the byte offset of the offending character (relative to the full
/// path string) and the source text that was being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at position {position}, {message} in `{source_text}`")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
    pub source_text: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: usize, source_text: &str) -> Self {
        Self {
            message: message.into(),
            position,
            source_text: source_text.to_string(),
        }
    }
}

/// Error type for path operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The path string is malformed
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Nothing in the document matched the path
    #[error("no match for `{path}`")]
    NotFound { path: String },

    /// The path is well formed but cannot be applied to this document shape
    #[error("evaluation error: {message}")]
    Evaluation { message: String },
}

impl Error {
    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// True for [`Error::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
