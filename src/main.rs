//! MCP Server Entry Point
//!
//! Loads configuration, initializes logging and serves the tools over the
//! configured transport.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use stateful_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    config.validate().context("invalid configuration")?;

    info!("Starting {} v{}", config.server.name, config.server.version);
    if let Some(secs) = config.sessions.idle_timeout_secs {
        info!("Sessions idle for {}s are discarded", secs);
    }

    let server = McpServer::new(config.clone());

    TransportService::new(config.transport)
        .run(server)
        .await
        .context("transport stopped")?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout belongs to the stdio transport. `RUST_LOG`
/// directives are honored on top of the configured level.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
