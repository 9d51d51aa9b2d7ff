//! Start the bridge from parsed CLI configuration

use std::sync::Arc;

use bridge_backend::HttpBackend;
use bridge_mcp::Bridge;
use tracing::{error, info};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use crate::utils::ColoredOutput;

pub async fn execute(cli: &Cli) -> CliResult<()> {
    let backend = HttpBackend::new(cli.backend_config())?;
    info!(backend = %backend.base_url(), "Fetching tool catalog");

    let bridge = Bridge::new(Arc::new(backend), cli.bind_addr())
        .with_server_version(env!("CARGO_PKG_VERSION"))
        .bind()
        .await
        .map_err(|e| {
            error!("Bridge startup failed: {}", e);
            CliError::Startup(e)
        })?;

    println!(
        "{} {} tools on {}",
        ColoredOutput::success("Serving"),
        bridge.server().tool_count(),
        ColoredOutput::highlight(&format!("http://{}/sse", bridge.local_addr()))
    );

    bridge.serve().await.map_err(|e| CliError::General(e.to_string()))
}
