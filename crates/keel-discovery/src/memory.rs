//! In-memory service registry
//!
//! Suitable for development and testing. Each member carries a health flag
//! and a round-trip estimate that stands in for network coordinates.

use crate::error::{DiscoveryError, Result};
use crate::registry::{ServiceEntry, ServiceRegistry};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Member {
    entry: ServiceEntry,
    healthy: bool,
    rtt: Duration,
}

/// In-memory service registry
pub struct InMemoryServiceRegistry {
    services: DashMap<String, Vec<Member>>,
    unreachable: AtomicBool,
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Register (or replace) a healthy member of `service`
    pub fn register(&self, service: &str, entry: ServiceEntry, rtt: Duration) {
        let mut members = self.services.entry(service.to_string()).or_default();
        members.retain(|m| m.entry.node != entry.node);
        members.push(Member {
            entry,
            healthy: true,
            rtt,
        });
    }

    /// Mark a member healthy or failing
    pub fn set_health(&self, service: &str, node: &str, healthy: bool) {
        if let Some(mut members) = self.services.get_mut(service) {
            for member in members.iter_mut().filter(|m| m.entry.node == node) {
                member.healthy = healthy;
            }
        }
    }

    pub fn deregister(&self, service: &str, node: &str) {
        if let Some(mut members) = self.services.get_mut(service) {
            members.retain(|m| m.entry.node != node);
        }
    }

    /// Make every lookup fail as if the agent could not be reached
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

impl Default for InMemoryServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRegistry for InMemoryServiceRegistry {
    async fn healthy_service(&self, service: &str, near: Option<&str>) -> Result<Vec<ServiceEntry>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Connection {
                address: "memory".to_string(),
                service: service.to_string(),
                reason: "registry marked unreachable".to_string(),
            });
        }

        let mut healthy: Vec<Member> = self
            .services
            .get(service)
            .map(|members| members.iter().filter(|m| m.healthy).cloned().collect())
            .unwrap_or_default();

        // Stable sort keeps registration order among equal estimates
        if near.is_some() {
            healthy.sort_by_key(|m| m.rtt);
        }

        Ok(healthy.into_iter().map(|m| m.entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NEAR_AGENT;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test]
    async fn test_near_orders_by_rtt() {
        let registry = InMemoryServiceRegistry::new();
        registry.register("cassandra", ServiceEntry::new("far", "10.0.0.3"), ms(40));
        registry.register("cassandra", ServiceEntry::new("near", "10.0.0.1"), ms(1));
        registry.register("cassandra", ServiceEntry::new("mid", "10.0.0.2"), ms(12));

        let entries = registry.healthy_service("cassandra", Some(NEAR_AGENT)).await.unwrap();
        let nodes: Vec<_> = entries.iter().map(|e| e.node.as_str()).collect();
        assert_eq!(nodes, vec!["near", "mid", "far"]);

        let unordered = registry.healthy_service("cassandra", None).await.unwrap();
        assert_eq!(unordered[0].node, "far");
    }

    #[tokio::test]
    async fn test_unhealthy_members_filtered() {
        let registry = InMemoryServiceRegistry::new();
        registry.register("cassandra", ServiceEntry::new("a", "10.0.0.1"), ms(1));
        registry.register("cassandra", ServiceEntry::new("b", "10.0.0.2"), ms(2));
        registry.set_health("cassandra", "a", false);

        let entries = registry.healthy_service("cassandra", Some(NEAR_AGENT)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node, "b");
    }

    #[tokio::test]
    async fn test_reregister_replaces_member() {
        let registry = InMemoryServiceRegistry::new();
        registry.register("cassandra", ServiceEntry::new("a", "10.0.0.1"), ms(1));
        registry.register("cassandra", ServiceEntry::new("a", "10.0.0.9"), ms(1));
        registry.deregister("cassandra", "missing");

        let entries = registry.healthy_service("cassandra", None).await.unwrap();
        assert_eq!(entries, vec![ServiceEntry::new("a", "10.0.0.9")]);
    }

    #[tokio::test]
    async fn test_unknown_service_is_empty() {
        let registry = InMemoryServiceRegistry::new();
        assert!(registry.healthy_service("nope", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable() {
        let registry = InMemoryServiceRegistry::new();
        registry.set_unreachable(true);
        assert!(registry.healthy_service("cassandra", None).await.is_err());
    }
}
