//! Keel configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-west-2";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeelConfig {
    /// Cloud provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Column-store session settings
    #[serde(default)]
    pub cassandra: CassandraConfig,

    /// Service registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KeelConfig {
    /// Load configuration from defaults, an optional file and `KEEL_` env vars
    ///
    /// Nested keys use a double underscore, e.g. `KEEL_PROVIDER__REGION`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        builder = builder.add_source(::config::Config::try_from(&KeelConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("KEEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Where provider credentials come from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Ambient credential chain (environment, profile, instance role)
    Environment,
    /// Explicit key pair
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "Environment"),
            CredentialSource::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Cloud provider configuration, passed to each resource adapter at construction
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Region every provider call is made against
    #[serde(default = "default_region")]
    pub region: String,

    /// Static access key id; empty means use the environment chain
    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("region", &self.region)
            .field("credentials", &self.credentials())
            .finish()
    }
}

impl ProviderConfig {
    /// Provider config for a region using ambient credentials
    pub fn for_region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Provider config using a static key pair
    pub fn with_static_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.secret_access_key = secret_access_key.into();
        self
    }

    pub fn credentials(&self) -> CredentialSource {
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            CredentialSource::Environment
        } else {
            CredentialSource::Static {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            }
        }
    }
}

/// Column-store session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CassandraConfig {
    /// Contact points used when registry discovery is disabled or empty
    #[serde(default = "default_contact_points")]
    pub contact_points: Vec<String>,

    #[serde(default = "default_cql_port")]
    pub port: u16,

    /// Keyspace selected when a session is opened; empty for none
    #[serde(default)]
    pub keyspace: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Resolve contact points through the service registry
    #[serde(default)]
    pub discover_contact_points: bool,
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: default_contact_points(),
            port: default_cql_port(),
            keyspace: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            discover_contact_points: false,
        }
    }
}

impl CassandraConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Service registry configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry agent HTTP address
    #[serde(default = "default_registry_address")]
    pub address: String,

    /// ACL token; empty for anonymous access
    #[serde(default)]
    pub token: String,

    /// Service name the column-store nodes register under
    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: default_registry_address(),
            token: String::new(),
            service_name: default_service_name(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("RegistryConfig")
            .field("address", &self.address)
            .field("token", &token)
            .field("service_name", &self.service_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl RegistryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_contact_points() -> Vec<String> {
    vec!["127.0.0.1".to_string()]
}

fn default_cql_port() -> u16 {
    9042
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_registry_address() -> String {
    "http://127.0.0.1:8500".to_string()
}

fn default_service_name() -> String {
    "cassandra".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}
