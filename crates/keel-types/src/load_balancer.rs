//! Load balancer definitions

use crate::error::{DefinitionError, Result};
use serde::{Deserialize, Serialize};

/// A single listener mapping a load-balancer port to an instance port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElbListener {
    /// Port the backing instances listen on
    pub instance_port: u16,

    /// Port exposed by the load balancer
    #[serde(rename = "lb_port")]
    pub load_balancer_port: u16,

    /// Front-end protocol (HTTP, HTTPS, TCP, SSL)
    #[serde(rename = "lb_protocol")]
    pub load_balancer_protocol: String,

    /// Back-end protocol
    pub instance_protocol: String,

    /// Server certificate id, empty when the listener does not terminate TLS
    #[serde(default)]
    pub certificate_id: String,
}

impl ElbListener {
    /// Plain listener with the same protocol on both sides and no certificate
    pub fn new(protocol: impl Into<String>, load_balancer_port: u16, instance_port: u16) -> Self {
        let protocol = protocol.into();
        Self {
            instance_port,
            load_balancer_port,
            load_balancer_protocol: protocol.clone(),
            instance_protocol: protocol,
            certificate_id: String::new(),
        }
    }

    /// Attach a certificate id
    pub fn with_certificate(mut self, certificate_id: impl Into<String>) -> Self {
        self.certificate_id = certificate_id.into();
        self
    }

    pub fn has_certificate(&self) -> bool {
        !self.certificate_id.is_empty()
    }
}

/// Desired state of a classic load balancer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerDefinition {
    /// Name, unique within the provider account and region
    pub name: String,

    /// Listeners in the order they should be created
    #[serde(default)]
    pub listeners: Vec<ElbListener>,

    #[serde(default)]
    pub security_groups: Vec<String>,

    /// `internet-facing` or `internal`
    #[serde(default)]
    pub scheme: String,

    #[serde(default)]
    pub subnets: Vec<String>,
}

impl LoadBalancerDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_listener(mut self, listener: ElbListener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_security_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.security_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subnets(mut self, subnets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.subnets = subnets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Check the invariants a provider call relies on
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DefinitionError::MissingLoadBalancerName);
        }
        if self.listeners.is_empty() {
            return Err(DefinitionError::NoListeners(self.name.clone()));
        }
        Ok(())
    }
}
