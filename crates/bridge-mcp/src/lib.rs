//! Swagger MCP Bridge
//!
//! Exposes a backend's REST tool catalog as MCP tools over Server-Sent
//! Events and proxies every tool call to the backend unchanged.

pub mod bridge;
pub mod catalog;
pub mod error;
pub mod jsonrpc;
pub mod mcp;
pub mod schema;
pub mod server;
pub mod transport;

pub use bridge::{BoundBridge, Bridge};
pub use catalog::{build_tool_entries, translate, ToolEntry, ToolInvocation};
pub use error::{McpError, McpResult};
pub use server::{McpServer, SERVER_NAME};
pub use transport::SseTransport;
