//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use pipbook_store::DEFAULT_TRADE_LIMIT;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// User id applied when a request does not name one
pub const DEFAULT_USER: &str = "demo_user";

/// Origin of the web frontend in development
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Instrument and journal configuration
    pub journal: JournalConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
}

/// Instrument and journal configuration.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// JSON file with extra or overriding pip-table entries
    pub instruments_file: Option<PathBuf>,
    /// User id applied when a request does not name one
    pub default_user: String,
    /// Page size of a trade listing when the request gives none
    pub trade_list_limit: usize,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let journal = Self::load_journal_config()?;

        Ok(Self {
            api,
            journal,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            },
            journal: JournalConfig::default(),
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("PIPBOOK_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid PIPBOOK_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("PIPBOOK_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = Self::load_parsed_env("PIPBOOK_API_PORT", 8080u16)?;
        let cors_origins = env::var("PIPBOOK_CORS_ORIGINS")
            .map(|val| parse_origins(&val))
            .unwrap_or_else(|_| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        Ok(ApiConfig {
            host,
            port,
            cors_origins,
        })
    }

    fn load_journal_config() -> DaemonResult<JournalConfig> {
        let instruments_file = env::var("PIPBOOK_INSTRUMENTS_FILE")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from);

        let default_user =
            env::var("PIPBOOK_DEFAULT_USER").unwrap_or_else(|_| DEFAULT_USER.to_string());

        let trade_list_limit =
            Self::load_parsed_env("PIPBOOK_TRADE_LIST_LIMIT", DEFAULT_TRADE_LIMIT)?;
        if trade_list_limit == 0 {
            return Err(DaemonError::Config(
                "PIPBOOK_TRADE_LIST_LIMIT must be positive".to_string(),
            ));
        }

        Ok(JournalConfig {
            instruments_file,
            default_user,
            trade_list_limit,
        })
    }

    fn load_parsed_env<T: FromStr>(key: &str, default: T) -> DaemonResult<T> {
        match env::var(key) {
            Ok(val) => val
                .trim()
                .parse::<T>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            },
            journal: JournalConfig::default(),
            environment: Environment::Development,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            instruments_file: None,
            default_user: DEFAULT_USER.to_string(),
            trade_list_limit: DEFAULT_TRADE_LIMIT,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
