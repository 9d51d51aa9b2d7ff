//! Startup failures surface as `CliError::Startup`, which `main` turns into exit code 1

use bridge_backend::BackendError;
use bridge_cli::{serve, Cli, CliError};
use bridge_mcp::McpError;
use clap::Parser;
use httpmock::prelude::*;

fn cli_for(backend_url: &str) -> Cli {
    Cli::try_parse_from([
        "swagger-mcp-bridge",
        "--backend-url",
        backend_url,
        "--host",
        "127.0.0.1",
        "--port",
        "0",
    ])
    .unwrap()
}

#[tokio::test]
async fn catalog_server_error_fails_startup() {
    let backend = MockServer::start_async().await;
    let catalog = backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(500).body("internal error");
        })
        .await;

    let result = serve::execute(&cli_for(&backend.base_url())).await;

    catalog.assert_async().await;
    match result {
        Err(CliError::Startup(McpError::Backend(BackendError::BackendUnavailable(msg)))) => {
            assert!(msg.contains("500"), "msg={}", msg);
        }
        other => panic!("expected startup failure, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_catalog_fails_startup() {
    let backend = MockServer::start_async().await;
    backend
        .mock_async(|when, then| {
            when.method(GET).path("/tools");
            then.status(200).json_body(serde_json::json!([{"summary": "no id"}]));
        })
        .await;

    let result = serve::execute(&cli_for(&backend.base_url())).await;
    assert!(
        matches!(result, Err(CliError::Startup(McpError::MalformedDescriptor { index: 0, .. }))),
        "got {:?}",
        result
    );
}

#[tokio::test]
async fn invalid_backend_url_is_config_error() {
    let result = serve::execute(&cli_for("not a url")).await;
    assert!(matches!(result, Err(CliError::Config(_))), "got {:?}", result);
}
