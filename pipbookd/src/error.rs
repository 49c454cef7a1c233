//! Daemon error types.

use pipbook_domain::DomainError;
use pipbook_engine::CalcError;
use pipbook_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Calculation error
    #[error("{0}")]
    Calc(#[from] CalcError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Trade not found
    #[error("Trade not found: {0}")]
    TradeNotFound(Uuid),

    /// Trade belongs to another user
    #[error("Access denied to trade: {0}")]
    AccessDenied(Uuid),

    /// Malformed request parameter
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server I/O error (bind, serve)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
