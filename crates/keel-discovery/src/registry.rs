//! Service registry trait and types

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Proximity anchor meaning "the agent answering the query"
pub const NEAR_AGENT: &str = "_agent";

/// A registered instance of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Node name as known to the registry
    pub node: String,

    /// Network address of the node
    pub address: String,

    /// Service-specific address, empty when the service uses the node address
    pub service_address: String,

    pub service_port: u16,
}

impl ServiceEntry {
    pub fn new(node: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            address: address.into(),
            service_address: String::new(),
            service_port: 0,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.service_port = port;
        self
    }
}

/// A registry of service instances
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Healthy instances of `service`
    ///
    /// With `near` set, results are ordered by ascending estimated round-trip
    /// time from that node. An empty result is not an error.
    async fn healthy_service(&self, service: &str, near: Option<&str>) -> Result<Vec<ServiceEntry>>;
}
