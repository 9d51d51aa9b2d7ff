//! CLI argument definitions using clap

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use bridge_backend::{HttpBackendConfig, DEFAULT_BACKEND_URL};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "swagger-mcp-bridge",
    about = "Swagger MCP Bridge - serve a REST tool catalog as MCP tools over SSE",
    version
)]
pub struct Cli {
    /// Base URL of the REST tool service [default: http://localhost:8081]
    #[arg(long, env = "BRIDGE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Backend URL as named by existing bridge deployments; used when
    /// BRIDGE_BACKEND_URL is unset
    #[arg(long = "java-mcp-url", env = "JAVA_MCP_URL", hide = true)]
    pub java_mcp_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "BRIDGE_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "BRIDGE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Per-request timeout for backend calls
    #[arg(long, env = "BRIDGE_BACKEND_TIMEOUT_SECS", default_value_t = 30)]
    pub backend_timeout_secs: u64,

    /// Extra header sent on every backend request, as Name=Value. Several
    /// headers are separated by commas, so a value cannot itself contain one.
    #[arg(
        long = "backend-header",
        env = "BRIDGE_BACKEND_HEADERS",
        value_delimiter = ',',
        value_parser = parse_header
    )]
    pub backend_headers: Vec<(String, String)>,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url
            .as_deref()
            .or(self.java_mcp_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn backend_config(&self) -> HttpBackendConfig {
        self.backend_headers.iter().fold(
            HttpBackendConfig::new(self.backend_url())
                .with_timeout(Duration::from_secs(self.backend_timeout_secs)),
            |config, (name, value)| config.with_header(name.clone(), value.clone()),
        )
    }
}

/// Parse a `Name=Value` header pair
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
