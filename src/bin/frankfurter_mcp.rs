//! MCP Server binary entry point
//!
//! Run with: cargo run --bin frankfurter-mcp
//!
//! Configuration comes from the environment and an optional `.env` file,
//! see `frankfurter_mcp::config`.

use frankfurter_mcp::mcp::ServiceHost;
use frankfurter_mcp::{ServerConfig, ServiceError};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

async fn start() -> Result<(), ServiceError> {
    let config = ServerConfig::from_env()?;
    ServiceHost::new(config).run().await
}

#[tokio::main]
async fn main() {
    // Load `.env` first so it can also set RUST_LOG
    let dotenv = dotenvy::dotenv();

    // Initialize logging to stderr (stdout is for MCP protocol)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "cannot read environment file"),
    }

    // The stdio reader may still be blocked on stdin; exit without waiting for it
    match start().await {
        Ok(()) => std::process::exit(0),
        Err(e) if e.is_fatal() => {
            error!(error = %e, "startup aborted");
            std::process::exit(e.exit_code())
        }
        Err(e) => {
            error!(error = %e, "server stopped");
            std::process::exit(e.exit_code())
        }
    }
}
