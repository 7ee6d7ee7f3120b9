//! Definition validation errors

use thiserror::Error;

/// Errors raised while validating or loading a desired-state definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Load balancer definition has no name")]
    MissingLoadBalancerName,

    #[error("Load balancer {0} must declare at least one listener")]
    NoListeners(String),

    #[error("Instance definition for image {ami} requests {count} instances")]
    InvalidInstanceCount { ami: String, count: u32 },

    #[error("Instance definition has no image id")]
    MissingImage,

    #[error("Schema manifest parse error: {0}")]
    Manifest(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for definition operations
pub type Result<T> = std::result::Result<T, DefinitionError>;
