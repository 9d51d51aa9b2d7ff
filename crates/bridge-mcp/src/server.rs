//! MCP server: JSON-RPC dispatch over a frozen set of registered tools

use std::collections::HashMap;

use rmcp::model as m;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::{
    catalog::ToolEntry,
    jsonrpc::{
        error_response, extract_id, success_response, JsonRpcError, JsonRpcRequest,
        JsonRpcResponse, JSONRPC_VERSION,
    },
    mcp::{
        negotiate_protocol_version, Implementation, InitializeRequest, InitializeResponse,
        ServerCapabilities, ToolsCallRequest, ToolsCapability, METHOD_INITIALIZE, METHOD_PING,
        METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    },
    McpError, McpResult,
};

/// Display name announced to MCP clients
pub const SERVER_NAME: &str = "swagger-mcp-server";

struct RegisteredTool {
    entry: ToolEntry,
    tool: m::Tool,
}

/// MCP Server
pub struct McpServer {
    info: Implementation,
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Implementation { name: name.into(), version: version.into() },
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Register a tool. The first registration of a name wins; later ones are
    /// skipped and `false` is returned.
    pub fn register(&mut self, entry: ToolEntry) -> bool {
        if self.by_name.contains_key(&entry.name) {
            warn!(tool = %entry.name, "Tool name conflict detected, keeping first registration");
            return false;
        }
        debug!(tool = %entry.name, "registering tool");
        let tool = entry.to_mcp_tool();
        self.by_name.insert(entry.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool { entry, tool });
        true
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.entry.name.as_str())
    }

    fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.by_name.get(name).and_then(|idx| self.tools.get(*idx))
    }

    /// Process a single raw MCP message
    pub async fn process_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        match serde_json::from_slice::<Value>(body) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                error!("Failed to parse JSON-RPC message: {}", e);
                Some(error_response(
                    None,
                    JsonRpcError::parse_error().with_data(json!({"message": e.to_string()})),
                ))
            }
        }
    }

    /// Handle one decoded JSON value; `None` means nothing is sent back
    pub async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        if message.is_array() {
            // MCP doesn't support batch
            error!("Batch requests are not supported");
            return Some(error_response(
                None,
                JsonRpcError::invalid_request()
                    .with_data(json!({"message": "Batch requests are not supported"})),
            ));
        }

        match serde_json::from_value::<JsonRpcRequest>(message.clone()) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                Some(error_response(
                    extract_id(&message),
                    JsonRpcError::invalid_request().with_data(json!({"message": e.to_string()})),
                ))
            }
        }
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(error_response(
                request.id,
                JsonRpcError::invalid_request()
                    .with_data(json!({"message": "Invalid JSON-RPC version"})),
            ));
        }

        // Notifications get no response
        let Some(id) = request.id else {
            debug!(method = %request.method, "Received notification, ignoring");
            return None;
        };

        debug!("Processing method: {}", request.method);

        let result = match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(request.params),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(request.params).await,
            other => {
                return Some(error_response(
                    Some(id),
                    JsonRpcError::method_not_found().with_data(json!({"method": other})),
                ))
            }
        };

        Some(match result {
            Ok(value) => success_response(Some(id), value),
            Err(e) => {
                warn!(method = %request.method, "request failed: {}", e);
                error_response(Some(id), e.to_jsonrpc_error())
            }
        })
    }

    fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params.ok_or_else(|| {
            McpError::InvalidArguments("Missing params for initialize".to_string())
        })?;
        let init: InitializeRequest = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidArguments(format!("Invalid initialize params: {}", e)))?;

        let protocol_version = negotiate_protocol_version(&init.protocol_version);
        if let Some(client) = &init.client_info {
            info!(
                client = %client.name,
                client_version = %client.version,
                protocol_version,
                "MCP client initialized"
            );
        }

        let response = InitializeResponse {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: self.info.clone(),
            instructions: Some(
                "Tools are generated from the backend's REST catalog; call them with the \
                 arguments their input schema describes"
                    .to_string(),
            ),
        };
        Ok(serde_json::to_value(response)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = m::ListToolsResult {
            tools: self.tools.iter().map(|t| t.tool.clone()).collect(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params.ok_or_else(|| {
            McpError::InvalidArguments("Missing params for tools/call".to_string())
        })?;
        let call: ToolsCallRequest = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidArguments(format!("Invalid tools/call params: {}", e)))?;

        let registered =
            self.lookup(&call.name).ok_or_else(|| McpError::ToolNotFound(call.name.clone()))?;

        let args = match call.arguments {
            None | Some(Value::Null) => json!({}),
            Some(args) => args,
        };

        debug!(tool = %call.name, "Calling tool");
        let result = match registered.entry.invocation.invoke(args).await {
            Ok(value) => to_call_result(value),
            Err(e) => {
                warn!(tool = %call.name, status = ?e.status(), "tool invocation failed: {}", e);
                m::CallToolResult::error(vec![m::Content::text(e.to_string())])
            }
        };
        Ok(serde_json::to_value(result)?)
    }
}

/// Objects go out as structured content; anything else as a single text block
fn to_call_result(value: Value) -> m::CallToolResult {
    match value {
        Value::Object(_) => m::CallToolResult::structured(value),
        Value::String(text) => m::CallToolResult::success(vec![m::Content::text(text)]),
        other => m::CallToolResult::success(vec![m::Content::text(other.to_string())]),
    }
}
