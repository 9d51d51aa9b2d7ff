//! Error types for the backend tool service client

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised while talking to the tool-providing backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The catalog could not be fetched (transport failure, non-2xx status or
    /// an undecodable body). Never carries partial data.
    #[error("Tool catalog unavailable: {0}")]
    BackendUnavailable(String),

    /// A single tool invocation was answered with a non-2xx status
    #[error("Invocation failed ({status}): {body}")]
    InvocationFailed { status: u16, body: String },

    /// The invocation request never produced a response
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// Status code reported by the backend, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::InvocationFailed { status, .. } => Some(*status),
            BackendError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
