//! Error types for token corpus operations.

use thiserror::Error;

/// Errors raised by `TokensObject` operations.
///
/// Every variant is detected before the object is touched,
/// so a failed operation leaves the corpus as it was.
#[derive(Error, Debug)]
pub enum TokensError {
    /// Document index outside `[1, ndoc]`
    #[error("Invalid document index: {index} (document count is {ndoc})")]
    Range { index: usize, ndoc: usize },

    /// Invalid parameter or operand state
    #[error("Invalid value: {0}")]
    Value(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// CBOR encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_cbor::Error),
}

impl TokensError {
    pub(crate) fn value(msg: impl Into<String>) -> Self {
        TokensError::Value(msg.into())
    }
}

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, TokensError>;
