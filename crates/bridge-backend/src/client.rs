//! HTTP client for the REST tool service (`GET /tools`, `POST /tools/{id}/invoke`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use url::Url;

use crate::descriptor::ToolDescriptor;
use crate::error::{BackendError, BackendResult};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// The two calls the bridge needs from a tool-providing service
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// List the backend's tools, all or nothing
    async fn fetch_tools(&self) -> BackendResult<Vec<ToolDescriptor>>;

    /// Invoke one tool with `args` as the full request body
    async fn invoke_tool(&self, tool_id: &str, args: JsonValue) -> BackendResult<JsonValue>;
}

/// Connection settings for [`HttpBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub base_url: String,
    /// Total time allowed for one request, response body included
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Static headers sent with every request
    pub headers: Vec<(String, String)>,
}

impl HttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            headers: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

/// reqwest-backed [`ToolBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> BackendResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            BackendError::Config(format!("Invalid backend URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "Backend URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BackendError::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                BackendError::Config(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Config(format!("Backend URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ToolBackend for HttpBackend {
    async fn fetch_tools(&self) -> BackendResult<Vec<ToolDescriptor>> {
        let url = self.endpoint(&["tools"])?;
        debug!(url = %url, "fetching tool catalog");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BackendError::BackendUnavailable(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "tool catalog request rejected");
            return Err(BackendError::BackendUnavailable(format!(
                "GET {} returned {}: {}",
                url, status, body
            )));
        }

        let tools: Vec<ToolDescriptor> = response.json().await.map_err(|e| {
            BackendError::BackendUnavailable(format!("Invalid tool catalog from {}: {}", url, e))
        })?;

        info!(url = %url, count = tools.len(), "fetched tool catalog");
        Ok(tools)
    }

    async fn invoke_tool(&self, tool_id: &str, args: JsonValue) -> BackendResult<JsonValue> {
        let url = self.endpoint(&["tools", tool_id, "invoke"])?;
        debug!(tool = %tool_id, url = %url, "invoking backend tool");

        let response = self.client.post(url).json(&args).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(tool = %tool_id, status = status.as_u16(), "backend tool invocation failed");
            return Err(BackendError::InvocationFailed { status: status.as_u16(), body });
        }

        debug!(tool = %tool_id, status = status.as_u16(), "backend tool invocation succeeded");
        Ok(decode_result(body))
    }
}

/// JSON bodies are returned as decoded; anything else is kept as raw text
fn decode_result(body: String) -> JsonValue {
    if body.trim().is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(&body).unwrap_or(JsonValue::String(body))
}
