//! Model error types.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while decoding inbound payloads.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to decode task payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid task: {0}")]
    InvalidTask(String),
}

impl ModelError {
    pub fn invalid_task(msg: impl Into<String>) -> Self {
        Self::InvalidTask(msg.into())
    }
}
