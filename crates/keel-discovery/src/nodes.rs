//! Column-store node discovery

use crate::consul::ConsulRegistry;
use crate::error::Result;
use crate::registry::{ServiceRegistry, NEAR_AGENT};
use keel_config::{CassandraConfig, RegistryConfig};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Service name column-store nodes conventionally register under
pub const CASSANDRA_SERVICE: &str = "cassandra";

/// Resolves the healthy members of the column-store service, nearest first
pub struct NodeDiscovery {
    registry: Arc<dyn ServiceRegistry>,
    service_name: String,
}

impl NodeDiscovery {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self::with_service_name(registry, CASSANDRA_SERVICE)
    }

    pub fn with_service_name(registry: Arc<dyn ServiceRegistry>, service_name: impl Into<String>) -> Self {
        Self {
            registry,
            service_name: service_name.into(),
        }
    }

    /// Discovery against the Consul agent named in `config`
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let registry = ConsulRegistry::new(config)?;
        Ok(Self::with_service_name(Arc::new(registry), config.service_name.clone()))
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Node addresses of healthy members in ascending proximity order
    ///
    /// Returns an empty list when the registry answers but nothing healthy is
    /// registered; only registry communication failures are errors.
    #[instrument(skip(self), fields(service = %self.service_name))]
    pub async fn nodes(&self) -> Result<Vec<String>> {
        let entries = self
            .registry
            .healthy_service(&self.service_name, Some(NEAR_AGENT))
            .await?;

        let nodes: Vec<String> = entries.into_iter().map(|e| e.address).collect();
        debug!(count = nodes.len(), "Discovered healthy nodes");
        Ok(nodes)
    }

    /// Discovered nodes, or `fallback` when none are healthy
    pub async fn contact_points_or(&self, fallback: &[String]) -> Result<Vec<String>> {
        let nodes = self.nodes().await?;
        if nodes.is_empty() {
            debug!("No healthy nodes registered, using configured contact points");
            return Ok(fallback.to_vec());
        }
        Ok(nodes)
    }
}

/// Contact points a session should be built from
///
/// The configured points are used as-is unless `discover_contact_points` is
/// set, in which case the registry is asked first and the configured points
/// only fill in when no healthy member is registered.
#[instrument(skip_all, fields(discover = cassandra.discover_contact_points))]
pub async fn resolve_contact_points(
    cassandra: &CassandraConfig,
    registry: &RegistryConfig,
) -> Result<Vec<String>> {
    if !cassandra.discover_contact_points {
        return Ok(cassandra.contact_points.clone());
    }
    NodeDiscovery::from_config(registry)?
        .contact_points_or(&cassandra.contact_points)
        .await
}
