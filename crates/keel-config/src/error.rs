//! Configuration error types

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("Tracing subscriber already installed: {0}")]
    Telemetry(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
