//! Pipbook Daemon
//!
//! Serves the calculator, trade journal and analytics over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p pipbookd
//!
//! # Start with custom environment
//! PIPBOOK_ENV=test PIPBOOK_API_PORT=8081 cargo run -p pipbookd
//! ```
//!
//! # Environment Variables
//!
//! - `PIPBOOK_ENV`: Environment (test, development, production)
//! - `PIPBOOK_API_HOST`: API host (default: 0.0.0.0)
//! - `PIPBOOK_API_PORT`: API port (default: 8080)
//! - `PIPBOOK_CORS_ORIGINS`: Comma-separated allowed origins (default: http://localhost:3000)
//! - `PIPBOOK_INSTRUMENTS_FILE`: JSON file of extra pip-table entries
//! - `PIPBOOK_DEFAULT_USER`: User id when a request names none (default: demo_user)
//! - `PIPBOOK_TRADE_LIST_LIMIT`: Default trade listing size (default: 50)

use pipbookd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("pipbookd=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        "Pipbook Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::new_memory(config).await?;
    daemon.run().await?;

    Ok(())
}
