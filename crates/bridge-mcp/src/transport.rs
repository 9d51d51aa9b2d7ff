//! MCP HTTP+SSE transport
//!
//! `GET /sse` opens a session stream whose first event names the endpoint to
//! POST messages to. Responses to those messages are pushed back on the
//! session's stream.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::server::McpServer;

pub const SSE_PATH: &str = "/sse";
pub const MESSAGE_PATH: &str = "/message";
pub const HEALTH_PATH: &str = "/health";

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);
const SESSION_BUFFER: usize = 64;

type SessionTable = Arc<RwLock<HashMap<String, mpsc::Sender<String>>>>;

/// Shared state behind the SSE routes
#[derive(Clone)]
pub struct SseTransport {
    server: Arc<McpServer>,
    sessions: SessionTable,
    /// Flips to `true` once sessions are closed; in-flight message tasks watch it
    closing: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl SseTransport {
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            server,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            closing: Arc::new(watch::channel(false).0),
        }
    }

    pub fn server(&self) -> &Arc<McpServer> {
        &self.server
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(SSE_PATH, get(sse_handler))
            .route(MESSAGE_PATH, post(message_handler))
            .route(HEALTH_PATH, get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// End every open stream. Messages still being handled are abandoned,
    /// which drops the last senders their streams were waiting on.
    pub async fn close_sessions(&self) {
        self.closing.send_replace(true);
        let mut sessions = self.sessions.write().await;
        if !sessions.is_empty() {
            info!(count = sessions.len(), "closing SSE sessions");
        }
        sessions.clear();
    }
}

/// Removes its session from the table when the SSE stream is dropped
struct SessionGuard {
    id: String,
    sessions: SessionTable,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let id = std::mem::take(&mut self.id);
        let sessions = self.sessions.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if sessions.write().await.remove(&id).is_some() {
                    info!(session = %id, "SSE session closed");
                }
            });
        }
    }
}

async fn sse_handler(
    State(transport): State<SseTransport>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<String>(SESSION_BUFFER);
    transport.sessions.write().await.insert(session_id.clone(), tx);
    info!(session = %session_id, "SSE session opened");

    let endpoint = format!("{}?sessionId={}", MESSAGE_PATH, session_id);
    let guard = SessionGuard { id: session_id, sessions: transport.sessions.clone() };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<Event, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().event("message").data(message));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

async fn message_handler(
    State(transport): State<SseTransport>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let sender = transport.sessions.read().await.get(&query.session_id).cloned();
    let Some(sender) = sender else {
        warn!(session = %query.session_id, "message for unknown session");
        return (StatusCode::NOT_FOUND, "Session not found").into_response();
    };

    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(session = %query.session_id, "rejecting malformed message: {}", e);
            return (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)).into_response();
        }
    };

    let server = transport.server.clone();
    let session_id = query.session_id;
    let mut closing = transport.closing.subscribe();
    tokio::spawn(async move {
        if *closing.borrow_and_update() {
            return;
        }
        let response = tokio::select! {
            response = server.handle_message(message) => response,
            _ = closing.changed() => {
                debug!(session = %session_id, "abandoning in-flight message on shutdown");
                return;
            }
        };
        let Some(response) = response else {
            return;
        };
        let payload = match serde_json::to_string(&response) {
            Ok(payload) => payload,
            Err(e) => {
                error!(session = %session_id, "failed to encode response: {}", e);
                return;
            }
        };
        if sender.send(payload).await.is_err() {
            debug!(session = %session_id, "session closed before response was delivered");
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

async fn health_handler(State(transport): State<SseTransport>) -> Json<Value> {
    let server = transport.server();
    Json(json!({
        "status": "healthy",
        "service": server.name(),
        "version": server.version(),
        "tools": server.tool_count(),
    }))
}
