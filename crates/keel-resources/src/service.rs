//! Capability traits
//!
//! Callers depend on these traits rather than on an implementation, so the
//! real adapter and the recording double are interchangeable.

use async_trait::async_trait;
use keel_types::{DnsRecordDefinition, InstanceDefinition, LoadBalancerDefinition};

use crate::error::Result;

/// Load balancer lifecycle
#[async_trait]
pub trait LoadBalancerService: Send + Sync {
    /// Create a load balancer, returning its DNS name
    async fn create_load_balancer(&self, definition: &LoadBalancerDefinition) -> Result<String>;

    async fn delete_load_balancer(&self, name: &str) -> Result<()>;

    async fn register_instances(&self, name: &str, instance_ids: &[String]) -> Result<()>;

    async fn deregister_instances(&self, name: &str, instance_ids: &[String]) -> Result<()>;
}

/// DNS record lifecycle
#[async_trait]
pub trait DnsService: Send + Sync {
    async fn create_dns_record(&self, record: &DnsRecordDefinition) -> Result<()>;

    async fn delete_dns_record(&self, record: &DnsRecordDefinition) -> Result<()>;
}

/// Compute instance lifecycle and tagging
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Launch `definition.count` instances, returning their ids
    async fn run_instances(&self, definition: &InstanceDefinition) -> Result<Vec<String>>;

    async fn start_instances(&self, instance_ids: &[String]) -> Result<()>;

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<()>;

    /// Ids of instances carrying `key=value`, in provider order
    async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<String>>;

    async fn tag_instances(&self, instance_ids: &[String], key: &str, value: &str) -> Result<()>;

    /// Remove `key` from the instances whatever its value
    async fn delete_tag(&self, instance_ids: &[String], key: &str) -> Result<()>;
}

/// Load balancer and DNS capabilities together
pub trait ResourceService: LoadBalancerService + DnsService {}

impl<T: LoadBalancerService + DnsService + ?Sized> ResourceService for T {}
