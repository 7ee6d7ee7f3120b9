//! Session abstraction over the column-store driver

use crate::error::SessionError;
use async_trait::async_trait;
use keel_config::CassandraConfig;
use std::time::Duration;

/// Settings a session is opened with
///
/// `keyspace` is the keyspace selected on every session opened from this
/// config. The reconciler changes it in place, so one config must not be
/// shared by concurrently running reconciliations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub contact_points: Vec<String>,
    pub port: u16,
    pub keyspace: Option<String>,
    pub connect_timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self::from(&CassandraConfig::default())
    }
}

impl From<&CassandraConfig> for ClusterConfig {
    fn from(config: &CassandraConfig) -> Self {
        Self {
            contact_points: config.contact_points.clone(),
            port: config.port,
            keyspace: Some(config.keyspace.clone()).filter(|k| !k.is_empty()),
            connect_timeout: config.connect_timeout(),
        }
    }
}

impl ClusterConfig {
    pub fn new(contact_points: Vec<String>) -> Self {
        Self {
            contact_points,
            ..Default::default()
        }
    }

    /// Replace the contact points, e.g. with addresses from node discovery
    pub fn with_contact_points(mut self, contact_points: Vec<String>) -> Self {
        self.contact_points = contact_points;
        self
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// `host:port` list for log and error messages
    pub fn endpoints(&self) -> String {
        self.contact_points
            .iter()
            .map(|host| format!("{}:{}", host, self.port))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// An open session
#[async_trait]
pub trait CqlSession: Send + Sync {
    /// Execute a statement that returns no rows
    async fn execute(&self, statement: &str) -> Result<(), SessionError>;

    /// Run a query and return the first column of every row as text
    async fn query_column(&self, statement: &str, params: &[&str]) -> Result<Vec<String>, SessionError>;
}

/// Opens sessions from a [`ClusterConfig`]
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, config: &ClusterConfig) -> Result<Box<dyn CqlSession>, SessionError>;
}
