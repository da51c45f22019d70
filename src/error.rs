use thiserror::Error;

/// Caller contract violations. The engine is deterministic, so nothing here
/// is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl SearchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SearchError::InvalidConfiguration(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        SearchError::InvalidState(msg.into())
    }
}
