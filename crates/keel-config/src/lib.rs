//! Keel Config - configuration and telemetry
//!
//! Every adapter in the workspace is constructed from an explicit
//! configuration value; nothing reads process-wide state after start-up.
//! [`KeelConfig::load`] layers defaults, an optional file and `KEEL_`
//! environment variables, and [`init_tracing`] installs the subscriber.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod telemetry;

// Re-exports
pub use crate::config::{
    CassandraConfig, CredentialSource, KeelConfig, LoggingConfig, ProviderConfig, RegistryConfig,
    DEFAULT_REGION,
};
pub use error::{ConfigError, Result};
pub use telemetry::init_tracing;
