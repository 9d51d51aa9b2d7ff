//! Swagger MCP Bridge entry point

use bridge_cli::{cli::Cli, error::CliResult, serve, utils::init_tracing, ColoredOutput};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing()?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Swagger MCP Bridge v{}", env!("CARGO_PKG_VERSION"));

    serve::execute(&cli).await
}
