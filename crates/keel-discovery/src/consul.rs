//! Consul health endpoint client

use crate::error::{DiscoveryError, Result};
use crate::registry::{ServiceEntry, ServiceRegistry};
use async_trait::async_trait;
use keel_config::RegistryConfig;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Registry backed by a Consul agent's `/v1/health/service` endpoint
pub struct ConsulRegistry {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: HealthNode,
    #[serde(default)]
    service: Option<HealthService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthNode {
    node: String,
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthService {
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
}

impl From<HealthEntry> for ServiceEntry {
    fn from(entry: HealthEntry) -> Self {
        let (service_address, service_port) = entry
            .service
            .map(|s| (s.address, s.port))
            .unwrap_or_default();
        ServiceEntry {
            node: entry.node.node,
            address: entry.node.address,
            service_address,
            service_port,
        }
    }
}

impl ConsulRegistry {
    /// Create a client for the agent described by `config`
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Url::parse(&config.address).map_err(|e| DiscoveryError::InvalidAddress {
            address: config.address.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DiscoveryError::InvalidAddress {
                address: config.address.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.address.trim_end_matches('/').to_string(),
            token: Some(config.token.clone()).filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    #[instrument(skip(self), fields(registry = %self.base_url))]
    async fn healthy_service(&self, service: &str, near: Option<&str>) -> Result<Vec<ServiceEntry>> {
        let url = format!("{}/v1/health/service/{}", self.base_url, service);

        let mut request = self.client.get(&url).query(&[("passing", "true")]);
        if let Some(near) = near {
            request = request.query(&[("near", near)]);
        }
        if let Some(ref token) = self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(|e| DiscoveryError::Connection {
            address: self.base_url.clone(),
            service: service.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DiscoveryError::Connection {
            address: self.base_url.clone(),
            service: service.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(DiscoveryError::Registry {
                service: service.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let entries: Vec<HealthEntry> =
            serde_json::from_str(&body).map_err(|e| DiscoveryError::Decode {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        debug!(count = entries.len(), "Registry returned healthy members");

        Ok(entries.into_iter().map(ServiceEntry::from).collect())
    }
}
