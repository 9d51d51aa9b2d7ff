//! Error handling for the MCP bridge

use crate::jsonrpc::JsonRpcError;
use bridge_backend::BackendError;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur while building the catalog or serving MCP requests
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Malformed tool descriptor at index {index}: {reason}")]
    MalformedDescriptor { index: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::InvalidArguments(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({
                    "message": msg
                }))
            }
            McpError::ToolNotFound(name) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({
                    "message": format!("Unknown tool: {}", name)
                }))
            }
            _ => JsonRpcError::internal_error().with_data(serde_json::json!({
                "message": self.to_string()
            })),
        }
    }
}
