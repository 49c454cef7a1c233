//! Pipbook Daemon Library
//!
//! HTTP front of the Pipbook position-sizing calculator and trade journal.
//!
//! # Architecture
//!
//! ```text
//! Client → API Server → Calculator (position size, risk/reward, pip value)
//!                    ↘
//!                      Journal → TradeRepository (MemoryStore)
//!                         ↓
//!                     Analytics
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **Journal**: Trade lifecycle, ownership checks and analytics
//! - **API**: HTTP endpoints wrapped in a `{success, message, data, error}` envelope
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use pipbookd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::new_memory(config).await.expect("Failed to start");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod journal;

// Re-exports for convenience
pub use api::{create_router, ApiResponse, ApiState};
pub use config::{ApiConfig, Config, Environment, JournalConfig};
pub use daemon::{load_pip_table, Daemon};
pub use error::{DaemonError, DaemonResult};
pub use journal::Journal;
