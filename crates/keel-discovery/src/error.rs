//! Discovery error types

use thiserror::Error;

/// Discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Registry at {address} unreachable while looking up {service}: {reason}")]
    Connection {
        address: String,
        service: String,
        reason: String,
    },

    #[error("Registry rejected lookup of {service}: status {status}: {body}")]
    Registry {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Malformed registry response for {service}: {reason}")]
    Decode { service: String, reason: String },

    #[error("Invalid registry address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
