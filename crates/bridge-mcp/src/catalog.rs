//! Catalog translation: backend descriptors into MCP tool entries

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use bridge_backend::{BackendResult, ToolBackend, ToolDescriptor};
use rmcp::model as m;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{McpError, McpResult};
use crate::schema::{derive_input_schema, JsonObject};

/// Binds a tool id to the backend that executes it
#[derive(Clone)]
pub struct ToolInvocation {
    tool_id: String,
    backend: Arc<dyn ToolBackend>,
}

impl ToolInvocation {
    pub fn new(tool_id: impl Into<String>, backend: Arc<dyn ToolBackend>) -> Self {
        Self { tool_id: tool_id.into(), backend }
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// Forward `args` to the backend as-is and hand back its result as-is
    pub async fn invoke(&self, args: JsonValue) -> BackendResult<JsonValue> {
        self.backend.invoke_tool(&self.tool_id, args).await
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvocation").field("tool_id", &self.tool_id).finish_non_exhaustive()
    }
}

/// Protocol-side view of one backend tool
#[derive(Debug, Clone)]
pub struct ToolEntry {
    pub name: String,
    pub description: Option<String>,
    /// Backend parameter list, carried verbatim
    pub parameters: Vec<JsonValue>,
    pub invocation: ToolInvocation,
}

impl ToolEntry {
    pub fn input_schema(&self) -> JsonObject {
        derive_input_schema(&self.parameters)
    }

    pub fn to_mcp_tool(&self) -> m::Tool {
        m::Tool {
            name: Cow::Owned(self.name.clone()),
            title: None,
            description: self.description.clone().map(Cow::Owned),
            input_schema: Arc::new(self.input_schema()),
            output_schema: None,
            annotations: None,
            icons: None,
        }
    }
}

/// Translate descriptors in order. Fails as a whole on the first descriptor
/// without an id; duplicates are kept.
pub fn translate(
    descriptors: Vec<ToolDescriptor>,
    backend: Arc<dyn ToolBackend>,
) -> McpResult<Vec<ToolEntry>> {
    descriptors
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| to_entry(index, descriptor, backend.clone()))
        .collect()
}

fn to_entry(
    index: usize,
    descriptor: ToolDescriptor,
    backend: Arc<dyn ToolBackend>,
) -> McpResult<ToolEntry> {
    let ToolDescriptor { id, summary, path, parameters, .. } = descriptor;

    let name = match id {
        Some(id) if !id.is_empty() => id,
        Some(_) => {
            return Err(McpError::MalformedDescriptor { index, reason: "empty id".to_string() })
        }
        None => {
            return Err(McpError::MalformedDescriptor { index, reason: "missing id".to_string() })
        }
    };

    let description = summary.filter(|s| !s.is_empty()).or(path);
    debug!(tool = %name, "translated tool descriptor");

    Ok(ToolEntry {
        invocation: ToolInvocation::new(name.clone(), backend),
        name,
        description,
        parameters: parameters.unwrap_or_default(),
    })
}

/// Fetch the catalog once and translate it
pub async fn build_tool_entries(backend: Arc<dyn ToolBackend>) -> McpResult<Vec<ToolEntry>> {
    let descriptors = backend.fetch_tools().await?;
    let entries = translate(descriptors, backend)?;
    info!(count = entries.len(), "built tool entries from backend catalog");
    Ok(entries)
}
