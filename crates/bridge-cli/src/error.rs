//! Error types for the CLI

use bridge_backend::BackendError;
use bridge_mcp::McpError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The bridge could not build its catalog or bind its listener
    #[error("Startup failed: {0}")]
    Startup(#[from] McpError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

impl From<BackendError> for CliError {
    fn from(err: BackendError) -> Self {
        Self::Config(err.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
