//! End-to-end: HTTP tool backend -> bridge -> MCP client over SSE

use std::collections::HashMap;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use bridge_backend::{BackendError, HttpBackend, HttpBackendConfig, ToolBackend};
use bridge_mcp::{BoundBridge, Bridge, McpError};
use futures::{Stream, StreamExt};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tokio::sync::oneshot;

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Minimal SSE reader: yields (event, data) pairs, skipping comments
struct SseClient {
    stream: ByteStream,
    buffer: String,
}

impl SseClient {
    async fn connect(url: &str) -> Self {
        let response = reqwest::get(url).await.unwrap();
        assert!(response.status().is_success());
        Self { stream: Box::pin(response.bytes_stream()), buffer: String::new() }
    }

    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(pos) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..pos + 2).collect();
                let mut event = String::from("message");
                let mut data = Vec::new();
                for line in block.lines() {
                    if let Some(v) = line.strip_prefix("event:") {
                        event = v.trim().to_string();
                    } else if let Some(v) = line.strip_prefix("data:") {
                        data.push(v.strip_prefix(' ').unwrap_or(v).to_string());
                    }
                }
                if data.is_empty() {
                    continue;
                }
                return (event, data.join("\n"));
            }
            let chunk = self.stream.next().await.expect("stream ended").unwrap();
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    /// Read `message` events until every id in `ids` has been answered
    async fn responses_for(&mut self, ids: &[i64]) -> HashMap<i64, Value> {
        let mut found = HashMap::new();
        while found.len() < ids.len() {
            let (event, data) = self.next_event().await;
            assert_eq!(event, "message");
            let v: Value = serde_json::from_str(&data).unwrap();
            if let Some(id) = v["id"].as_i64().filter(|id| ids.contains(id)) {
                found.insert(id, v);
            }
        }
        found
    }
}

fn http_backend(server: &MockServer) -> Arc<dyn ToolBackend> {
    Arc::new(HttpBackend::new(HttpBackendConfig::new(server.base_url())).unwrap())
}

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn start(bridge: BoundBridge) -> (SocketAddr, oneshot::Sender<()>) {
    let addr = bridge.local_addr();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        bridge
            .serve_with_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
    });
    (addr, stop_tx)
}

async fn post(client: &reqwest::Client, url: &str, body: Value) -> reqwest::StatusCode {
    client.post(url).json(&body).send().await.unwrap().status()
}

#[tokio::test]
async fn tools_are_listed_and_invocations_proxied_over_sse() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(json!([
                {
                    "id": "getUser",
                    "summary": "Get a user",
                    "path": "/user/{id}",
                    "parameters": [{"name": "id", "inType": "path", "required": true, "type": "string"}]
                },
                {"id": "missingUser", "path": "/missing"}
            ]));
        })
        .await;
    let get_user = backend
        .mock_async(|when, then| {
            when.method(POST).path("/tools/getUser/invoke").json_body(json!({"id": "42"}));
            then.status(200).json_body(json!({"id": "42", "name": "Ada"}));
        })
        .await;
    backend
        .mock_async(|when, then| {
            when.method(POST).path("/tools/missingUser/invoke");
            then.status(404).body("not found").delay(Duration::from_millis(50));
        })
        .await;

    let bridge = Bridge::new(http_backend(&backend), loopback()).bind().await.unwrap();
    assert_eq!(bridge.server().tool_count(), 2);
    let (addr, stop) = start(bridge).await;
    let base = format!("http://{}", addr);

    let run = async {
        let mut sse = SseClient::connect(&format!("{}/sse", base)).await;
        let (event, endpoint) = sse.next_event().await;
        assert_eq!(event, "endpoint");
        assert!(endpoint.starts_with("/message?sessionId="), "endpoint={}", endpoint);
        let message_url = format!("{}{}", base, endpoint);
        let client = reqwest::Client::new();

        let status = post(
            &client,
            &message_url,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "e2e", "version": "0.0.1"}
            }}),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::ACCEPTED);
        let init = sse.responses_for(&[1]).await.remove(&1).unwrap();
        assert_eq!(init["result"]["serverInfo"]["name"], "swagger-mcp-server");

        post(&client, &message_url, json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        post(&client, &message_url, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let list = sse.responses_for(&[2]).await.remove(&2).unwrap();
        let tools = list["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "getUser");
        assert_eq!(tools[0]["description"], "Get a user");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["id"]));
        assert_eq!(tools[1]["description"], "/missing");

        // Failing and succeeding invocations in flight together
        let (a, b) = tokio::join!(
            post(
                &client,
                &message_url,
                json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                       "params": {"name": "missingUser", "arguments": {"id": "1"}}}),
            ),
            post(
                &client,
                &message_url,
                json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                       "params": {"name": "getUser", "arguments": {"id": "42"}}}),
            ),
        );
        assert_eq!(a, reqwest::StatusCode::ACCEPTED);
        assert_eq!(b, reqwest::StatusCode::ACCEPTED);

        let mut results = sse.responses_for(&[3, 4]).await;
        let failed = results.remove(&3).unwrap();
        assert_eq!(failed["result"]["isError"], json!(true));
        assert_eq!(failed["result"]["content"][0]["text"], "Invocation failed (404): not found");

        let ok = results.remove(&4).unwrap();
        assert_eq!(ok["result"]["structuredContent"], json!({"id": "42", "name": "Ada"}));

        let health: Value =
            client.get(format!("{}/health", base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(health["tools"], 2);
    };
    tokio::time::timeout(Duration::from_secs(10), run).await.expect("test timed out");

    get_user.assert_async().await;
    let _ = stop.send(());
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(json!([]));
        })
        .await;

    let bridge = Bridge::new(http_backend(&backend), loopback()).bind().await.unwrap();
    let (addr, stop) = start(bridge).await;

    let status = post(
        &reqwest::Client::new(),
        &format!("http://{}/message?sessionId=nope", addr),
        json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    let _ = stop.send(());
}

#[tokio::test]
async fn bind_fails_when_catalog_unavailable() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(500).body("internal error");
        })
        .await;

    let result = Bridge::new(http_backend(&backend), loopback()).bind().await;
    match result {
        Err(McpError::Backend(BackendError::BackendUnavailable(_))) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("bridge must not start without a catalog"),
    }
}

#[tokio::test]
async fn bind_fails_on_descriptor_without_id() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(json!([{"id": "ok"}, {"summary": "no id"}]));
        })
        .await;

    let result = Bridge::new(http_backend(&backend), loopback()).bind().await;
    assert!(matches!(result, Err(McpError::MalformedDescriptor { index: 1, .. })));
}
