//! Bridge lifecycle: build the catalog, register tools, bind, serve

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bridge_backend::ToolBackend;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::catalog::build_tool_entries;
use crate::error::{McpError, McpResult};
use crate::server::{McpServer, SERVER_NAME};
use crate::transport::{SseTransport, MESSAGE_PATH, SSE_PATH};

/// A bridge that has not fetched its catalog yet
pub struct Bridge {
    backend: Arc<dyn ToolBackend>,
    addr: SocketAddr,
    server_name: String,
    server_version: String,
}

impl Bridge {
    pub fn new(backend: Arc<dyn ToolBackend>, addr: SocketAddr) -> Self {
        Self {
            backend,
            addr,
            server_name: SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = version.into();
        self
    }

    /// Fetch and register the catalog, then bind the listener.
    ///
    /// Nothing is bound if the catalog cannot be built.
    pub async fn bind(self) -> McpResult<BoundBridge> {
        let entries = build_tool_entries(self.backend.clone()).await?;

        let fetched = entries.len();
        let mut server = McpServer::new(self.server_name, self.server_version);
        for entry in entries {
            server.register(entry);
        }
        let registered = server.tool_count();
        if registered < fetched {
            warn!(fetched, registered, "duplicate tool names were skipped");
        }
        info!(registered, "tool catalog registered");
        debug!(tools = ?server.tool_names().collect::<Vec<_>>(), "registered tool names");

        let listener = TcpListener::bind(self.addr).await.map_err(|e| {
            McpError::Internal(format!("Failed to bind to {}: {}", self.addr, e))
        })?;
        let local_addr = listener.local_addr()?;

        Ok(BoundBridge { listener, local_addr, transport: SseTransport::new(Arc::new(server)) })
    }
}

/// A bridge with a frozen catalog and a bound listener
pub struct BoundBridge {
    listener: TcpListener,
    local_addr: SocketAddr,
    transport: SseTransport,
}

impl BoundBridge {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn server(&self) -> &Arc<McpServer> {
        self.transport.server()
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn serve(self) -> McpResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    pub async fn serve_with_shutdown<F>(self, signal: F) -> McpResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let transport = self.transport.clone();
        let app = self.transport.router();

        info!("MCP SSE bridge listening on {}", self.local_addr);
        info!("SSE endpoint: http://{}{}", self.local_addr, SSE_PATH);
        info!("Message endpoint: http://{}{}", self.local_addr, MESSAGE_PATH);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                // Open SSE streams never finish on their own
                transport.close_sessions().await;
            })
            .await
            .map_err(|e| McpError::Internal(format!("HTTP server error: {}", e)))?;

        info!("MCP SSE bridge stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
