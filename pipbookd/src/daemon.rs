//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Pip table (built-in entries plus optional file overrides)
//! - Journal (trade lifecycle over the store)
//! - API Server (HTTP endpoints)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Build the pip table and journal
//! 3. Start API server
//! 4. Graceful shutdown on SIGINT

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use pipbook_domain::PipTable;
use pipbook_engine::Calculator;
use pipbook_store::{MemoryStore, TradeRepository};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::journal::Journal;

// =============================================================================
// Daemon
// =============================================================================

/// The main Pipbook daemon.
pub struct Daemon<S: TradeRepository + 'static> {
    /// Configuration
    config: Config,
    /// Journal service shared by the handlers
    journal: Arc<Journal<S>>,
}

impl Daemon<MemoryStore> {
    /// Create a daemon over an in-memory store.
    ///
    /// Loads the instrument file named in the configuration, if any.
    pub async fn new_memory(config: Config) -> DaemonResult<Self> {
        let table = load_pip_table(config.journal.instruments_file.as_deref()).await?;
        let calculator = Calculator::new(Arc::new(table));
        let store = Arc::new(MemoryStore::new());

        Ok(Self::new(config, Arc::new(Journal::new(store, calculator))))
    }
}

impl<S: TradeRepository + 'static> Daemon<S> {
    /// Create a new daemon with provided components.
    pub fn new(config: Config, journal: Arc<Journal<S>>) -> Self {
        Self { config, journal }
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT).
    pub async fn run(self) -> DaemonResult<()> {
        let table = self.journal.calculator().table();
        let pairs: Vec<String> = table.pairs().iter().map(|p| p.to_string()).collect();
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            instruments = table.len(),
            "Starting Pipbook daemon"
        );
        debug!(pairs = %pairs.join(","), "Instruments available");

        let app = self.build_app()?;
        let listener = self.bind().await?;
        let api_addr = listener.local_addr()?;
        info!(%api_addr, "API server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutdown complete");
        Ok(())
    }

    /// Build the router with tracing and CORS layers.
    pub fn build_app(&self) -> DaemonResult<Router> {
        let state = Arc::new(ApiState {
            journal: self.journal.clone(),
            default_user: self.config.journal.default_user.clone(),
            trade_list_limit: self.config.journal.trade_list_limit,
        });

        let cors = cors_layer(&self.config.api.cors_origins)?;

        Ok(create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors))
    }

    /// Start the API server in the background.
    ///
    /// Returns the bound address; the server lives until the runtime stops.
    pub async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let app = self.build_app()?;
        let listener = self.bind().await?;
        let local_addr = listener.local_addr()?;

        // Spawn the server task
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "API server error");
            }
        });

        Ok(local_addr)
    }

    async fn bind(&self) -> DaemonResult<TcpListener> {
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Built-in pip table, extended by the JSON file at `path` when given.
pub async fn load_pip_table(path: Option<&Path>) -> DaemonResult<PipTable> {
    let mut table = PipTable::builtin();

    if let Some(path) = path {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            DaemonError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let loaded = table.extend_from_json(&json).map_err(|e| {
            DaemonError::Config(format!("Invalid instruments file {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), loaded, total = table.len(), "Instruments loaded");
    }

    Ok(table)
}

/// CORS for the configured origins; `*` allows any origin.
fn cors_layer(origins: &[String]) -> DaemonResult<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| DaemonError::Config(format!("Invalid CORS origin: {}", origin)))
            })
            .collect::<DaemonResult<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}

// =============================================================================
// Tests
// =============================================================================
