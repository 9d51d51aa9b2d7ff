//! Swagger MCP Bridge backend client
//!
//! Talks to the REST tool service that owns the catalog: one call to list
//! tools, one call to invoke a tool by id.

pub mod client;
pub mod descriptor;
pub mod error;

pub use client::{HttpBackend, HttpBackendConfig, ToolBackend, DEFAULT_BACKEND_URL};
pub use descriptor::ToolDescriptor;
pub use error::{BackendError, BackendResult};
