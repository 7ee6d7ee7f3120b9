//! Provider API surface
//!
//! These traits are the seam between the facade and a concrete cloud SDK.
//! Request and response shapes follow the provider's wire vocabulary, so an
//! SDK binding only has to move fields across. Each trait method is a single
//! provider call with no retries.

use std::sync::Arc;

use async_trait::async_trait;
use keel_config::ProviderConfig;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Result of a single provider call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// ---------------------------------------------------------------------------
// Load balancing
// ---------------------------------------------------------------------------

/// Listener as the load balancer API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listener {
    pub instance_port: i64,
    pub load_balancer_port: i64,
    pub protocol: String,
    pub instance_protocol: String,
    pub ssl_certificate_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoadBalancerRequest {
    pub load_balancer_name: String,
    pub listeners: Vec<Listener>,
    pub security_groups: Vec<String>,
    pub subnets: Vec<String>,
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoadBalancerResponse {
    pub dns_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLoadBalancerRequest {
    pub load_balancer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub instance_id: String,
}

/// Register or deregister request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerInstancesRequest {
    pub load_balancer_name: String,
    pub instances: Vec<InstanceRef>,
}

#[async_trait]
pub trait ElbApi: Send + Sync {
    async fn create_load_balancer(
        &self,
        request: CreateLoadBalancerRequest,
    ) -> ProviderResult<CreateLoadBalancerResponse>;

    async fn delete_load_balancer(&self, request: DeleteLoadBalancerRequest) -> ProviderResult<()>;

    async fn register_instances_with_load_balancer(
        &self,
        request: LoadBalancerInstancesRequest,
    ) -> ProviderResult<()>;

    async fn deregister_instances_from_load_balancer(
        &self,
        request: LoadBalancerInstancesRequest,
    ) -> ProviderResult<()>;
}

// ---------------------------------------------------------------------------
// DNS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: i64,
    pub resource_records: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub action: ChangeAction,
    pub resource_record_set: ResourceRecordSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeResourceRecordSetsRequest {
    pub hosted_zone_id: String,
    pub change_batch: ChangeBatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
    pub status: String,
}

#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn change_resource_record_sets(
        &self,
        request: ChangeResourceRecordSetsRequest,
    ) -> ProviderResult<ChangeInfo>;
}

// ---------------------------------------------------------------------------
// Compute
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbsBlockDevice {
    pub delete_on_termination: bool,
    pub encrypted: bool,
    pub volume_size: i64,
    pub volume_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub ebs: EbsBlockDevice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInstancesRequest {
    pub image_id: String,
    pub instance_type: String,
    pub min_count: i64,
    pub max_count: i64,
    pub key_name: String,
    pub subnet_id: String,
    pub security_group_ids: Vec<String>,
    pub block_device_mappings: Vec<BlockDeviceMapping>,
    /// Base64 encoded
    pub user_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInstancesResponse {
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceIdsRequest {
    pub instance_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeInstancesRequest {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeInstancesResponse {
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    /// `None` matches any value when deleting
    pub value: Option<String>,
}

/// Create or delete tags request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsRequest {
    pub resources: Vec<String>,
    pub tags: Vec<Tag>,
}

#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn run_instances(&self, request: RunInstancesRequest) -> ProviderResult<RunInstancesResponse>;

    async fn start_instances(&self, request: InstanceIdsRequest) -> ProviderResult<()>;

    async fn stop_instances(&self, request: InstanceIdsRequest) -> ProviderResult<()>;

    async fn describe_instances(
        &self,
        request: DescribeInstancesRequest,
    ) -> ProviderResult<DescribeInstancesResponse>;

    async fn create_tags(&self, request: TagsRequest) -> ProviderResult<()>;

    async fn delete_tags(&self, request: TagsRequest) -> ProviderResult<()>;
}

// ---------------------------------------------------------------------------
// Client construction
// ---------------------------------------------------------------------------

/// Provider clients bound to one region and credential set
#[derive(Clone)]
pub struct ProviderClients {
    pub elb: Arc<dyn ElbApi>,
    pub dns: Arc<dyn DnsApi>,
    pub ec2: Arc<dyn Ec2Api>,
}

impl std::fmt::Debug for ProviderClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClients").finish_non_exhaustive()
    }
}

/// Builds provider clients from explicit configuration
pub trait ProviderFactory: Send + Sync {
    fn clients(&self, config: &ProviderConfig) -> ProviderResult<ProviderClients>;
}
