//! Provider-backed implementation of the capability traits

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use keel_config::ProviderConfig;
use keel_types::{
    DnsRecordDefinition, ElbListener, InstanceDefinition, LoadBalancerDefinition, ROOT_DEVICE_NAME,
    ROOT_VOLUME_TYPE,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{ResourceError, Result};
use crate::provider::{
    BlockDeviceMapping, Change, ChangeAction, ChangeBatch, ChangeResourceRecordSetsRequest,
    CreateLoadBalancerRequest, DeleteLoadBalancerRequest, DescribeInstancesRequest, EbsBlockDevice,
    Filter, InstanceIdsRequest, InstanceRef, Listener, LoadBalancerInstancesRequest,
    ProviderClients, ProviderFactory, ResourceRecordSet, RunInstancesRequest, Tag, TagsRequest,
};
use crate::service::{ComputeService, DnsService, LoadBalancerService};

/// Forwards every call to the provider exactly once
///
/// Holds no state beyond its configuration and client handles, so it can be
/// shared freely behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RealResourceService {
    config: ProviderConfig,
    clients: ProviderClients,
}

impl RealResourceService {
    pub fn new(config: ProviderConfig, clients: ProviderClients) -> Self {
        Self { config, clients }
    }

    /// Build clients for `config` and wrap them
    pub fn connect(config: ProviderConfig, factory: &dyn ProviderFactory) -> Result<Self> {
        let clients = factory.clients(&config).map_err(|e| {
            ResourceError::from_provider("Connect", config.region.clone(), e)
        })?;
        info!(region = %config.region, "Provider clients ready");
        Ok(Self::new(config, clients))
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn change_record(&self, action: ChangeAction, record: &DnsRecordDefinition) -> Result<()> {
        let label = match action {
            ChangeAction::Create => "CreateDNSRecord",
            ChangeAction::Delete => "DeleteDNSRecord",
        };
        let request = ChangeResourceRecordSetsRequest {
            hosted_zone_id: record.zone_id.clone(),
            change_batch: ChangeBatch {
                changes: vec![Change {
                    action,
                    resource_record_set: ResourceRecordSet {
                        name: record.name.clone(),
                        record_type: record.record_type.clone(),
                        ttl: ttl_value(record.ttl),
                        resource_records: vec![record.value.clone()],
                    },
                }],
            },
        };

        let change = self
            .clients
            .dns
            .change_resource_record_sets(request)
            .await
            .map_err(|e| fail(label, &record.name, e))?;

        debug!(
            zone_id = %record.zone_id,
            name = %record.name,
            change_id = %change.id,
            status = %change.status,
            "{} accepted", label
        );
        Ok(())
    }
}

/// Each output listener is an independent value built from one input element
pub(crate) fn translate_listeners(listeners: &[ElbListener]) -> Vec<Listener> {
    listeners
        .iter()
        .map(|l| Listener {
            instance_port: i64::from(l.instance_port),
            load_balancer_port: i64::from(l.load_balancer_port),
            protocol: l.load_balancer_protocol.clone(),
            instance_protocol: l.instance_protocol.clone(),
            ssl_certificate_id: l.has_certificate().then(|| l.certificate_id.clone()),
        })
        .collect()
}

pub(crate) fn run_request(definition: &InstanceDefinition) -> RunInstancesRequest {
    let count = i64::from(definition.count);
    RunInstancesRequest {
        image_id: definition.ami.clone(),
        instance_type: definition.instance_type.clone(),
        min_count: count,
        max_count: count,
        key_name: definition.keypair.clone(),
        subnet_id: definition.subnet.clone(),
        security_group_ids: vec![definition.security_group.clone()],
        block_device_mappings: vec![BlockDeviceMapping {
            device_name: ROOT_DEVICE_NAME.to_string(),
            ebs: EbsBlockDevice {
                delete_on_termination: true,
                encrypted: false,
                volume_size: i64::from(definition.effective_root_size_gb()),
                volume_type: ROOT_VOLUME_TYPE.to_string(),
            },
        }],
        user_data: STANDARD.encode(&definition.user_data),
    }
}

fn instance_refs(instance_ids: &[String]) -> Vec<InstanceRef> {
    instance_ids
        .iter()
        .map(|id| InstanceRef {
            instance_id: id.clone(),
        })
        .collect()
}

fn ttl_value(ttl: u64) -> i64 {
    i64::try_from(ttl).unwrap_or(i64::MAX)
}

fn id_list(instance_ids: &[String]) -> String {
    format!("[{}]", instance_ids.join(" "))
}

fn fail(action: &'static str, target: &str, err: crate::error::ProviderError) -> ResourceError {
    warn!(action, target, error = %err, "Provider call failed");
    ResourceError::from_provider(action, target, err)
}

#[async_trait]
impl LoadBalancerService for RealResourceService {
    #[instrument(skip(self, definition), fields(name = %definition.name, region = %self.config.region))]
    async fn create_load_balancer(&self, definition: &LoadBalancerDefinition) -> Result<String> {
        definition.validate()?;
        info!("Creating load balancer");

        let request = CreateLoadBalancerRequest {
            load_balancer_name: definition.name.clone(),
            listeners: translate_listeners(&definition.listeners),
            security_groups: definition.security_groups.clone(),
            subnets: definition.subnets.clone(),
            scheme: (!definition.scheme.is_empty()).then(|| definition.scheme.clone()),
        };

        let response = self
            .clients
            .elb
            .create_load_balancer(request)
            .await
            .map_err(|e| fail("CreateLoadBalancer", &definition.name, e))?;

        info!(
            name = %definition.name,
            dns_name = %response.dns_name,
            listeners = definition.listeners.len(),
            "Load balancer created"
        );
        Ok(response.dns_name)
    }

    async fn delete_load_balancer(&self, name: &str) -> Result<()> {
        info!(name, "Deleting load balancer");
        self.clients
            .elb
            .delete_load_balancer(DeleteLoadBalancerRequest {
                load_balancer_name: name.to_string(),
            })
            .await
            .map_err(|e| fail("DeleteLoadBalancer", name, e))?;

        info!(name, "Load balancer deleted");
        Ok(())
    }

    async fn register_instances(&self, name: &str, instance_ids: &[String]) -> Result<()> {
        self.clients
            .elb
            .register_instances_with_load_balancer(LoadBalancerInstancesRequest {
                load_balancer_name: name.to_string(),
                instances: instance_refs(instance_ids),
            })
            .await
            .map_err(|e| fail("RegisterInstances", name, e))?;

        debug!(name, count = instance_ids.len(), "Instances registered");
        Ok(())
    }

    async fn deregister_instances(&self, name: &str, instance_ids: &[String]) -> Result<()> {
        self.clients
            .elb
            .deregister_instances_from_load_balancer(LoadBalancerInstancesRequest {
                load_balancer_name: name.to_string(),
                instances: instance_refs(instance_ids),
            })
            .await
            .map_err(|e| fail("DeregisterInstances", name, e))?;

        debug!(name, count = instance_ids.len(), "Instances deregistered");
        Ok(())
    }
}

#[async_trait]
impl DnsService for RealResourceService {
    async fn create_dns_record(&self, record: &DnsRecordDefinition) -> Result<()> {
        self.change_record(ChangeAction::Create, record).await
    }

    async fn delete_dns_record(&self, record: &DnsRecordDefinition) -> Result<()> {
        self.change_record(ChangeAction::Delete, record).await
    }
}

#[async_trait]
impl ComputeService for RealResourceService {
    #[instrument(skip(self, definition), fields(ami = %definition.ami, count = definition.count))]
    async fn run_instances(&self, definition: &InstanceDefinition) -> Result<Vec<String>> {
        definition.validate()?;
        info!("Launching instances");

        let response = self
            .clients
            .ec2
            .run_instances(run_request(definition))
            .await
            .map_err(|e| fail("RunInstances", &definition.ami, e))?;

        let ids: Vec<String> = response
            .instances
            .into_iter()
            .map(|i| i.instance_id)
            .collect();

        info!(
            ami = %definition.ami,
            instance_type = %definition.instance_type,
            requested = definition.count,
            launched = ids.len(),
            "Instances launched"
        );
        Ok(ids)
    }

    async fn start_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.clients
            .ec2
            .start_instances(InstanceIdsRequest {
                instance_ids: instance_ids.to_vec(),
            })
            .await
            .map_err(|e| fail("StartInstances", &id_list(instance_ids), e))?;

        info!(count = instance_ids.len(), "Instances starting");
        Ok(())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.clients
            .ec2
            .stop_instances(InstanceIdsRequest {
                instance_ids: instance_ids.to_vec(),
            })
            .await
            .map_err(|e| fail("StopInstances", &id_list(instance_ids), e))?;

        info!(count = instance_ids.len(), "Instances stopping");
        Ok(())
    }

    async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<String>> {
        let request = DescribeInstancesRequest {
            filters: vec![Filter {
                name: format!("tag:{key}"),
                values: vec![value.to_string()],
            }],
        };

        let response = self
            .clients
            .ec2
            .describe_instances(request)
            .await
            .map_err(|e| fail("FindInstancesByTag", &format!("{key}={value}"), e))?;

        let ids: Vec<String> = response
            .reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .map(|i| i.instance_id)
            .collect();

        debug!(key, value, found = ids.len(), "Instances found by tag");
        Ok(ids)
    }

    async fn tag_instances(&self, instance_ids: &[String], key: &str, value: &str) -> Result<()> {
        self.clients
            .ec2
            .create_tags(TagsRequest {
                resources: instance_ids.to_vec(),
                tags: vec![Tag {
                    key: key.to_string(),
                    value: Some(value.to_string()),
                }],
            })
            .await
            .map_err(|e| fail("TagInstances", &id_list(instance_ids), e))?;

        debug!(key, value, count = instance_ids.len(), "Instances tagged");
        Ok(())
    }

    async fn delete_tag(&self, instance_ids: &[String], key: &str) -> Result<()> {
        self.clients
            .ec2
            .delete_tags(TagsRequest {
                resources: instance_ids.to_vec(),
                tags: vec![Tag {
                    key: key.to_string(),
                    value: None,
                }],
            })
            .await
            .map_err(|e| fail("DeleteTag", &id_list(instance_ids), e))?;

        debug!(key, count = instance_ids.len(), "Tag removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{
        ChangeInfo, CreateLoadBalancerResponse, DescribeInstancesResponse, DnsApi, Ec2Api, ElbApi,
        Instance, ProviderResult, Reservation, RunInstancesResponse,
    };
    use keel_types::DEFAULT_ROOT_SIZE_GB;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Captures every request and answers from canned values
    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<String>>,
        create_lb: Mutex<Vec<CreateLoadBalancerRequest>>,
        lb_instances: Mutex<Vec<LoadBalancerInstancesRequest>>,
        changes: Mutex<Vec<ChangeResourceRecordSetsRequest>>,
        runs: Mutex<Vec<RunInstancesRequest>>,
        describes: Mutex<Vec<DescribeInstancesRequest>>,
        tags: Mutex<Vec<TagsRequest>>,
        reservations: Vec<Reservation>,
        failure: Option<ProviderError>,
    }

    impl FakeProvider {
        fn failing(err: ProviderError) -> Self {
            Self {
                failure: Some(err),
                ..Default::default()
            }
        }

        fn answer(&self, call: &str) -> ProviderResult<()> {
            self.calls.lock().push(call.to_string());
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl ElbApi for FakeProvider {
        async fn create_load_balancer(
            &self,
            request: CreateLoadBalancerRequest,
        ) -> ProviderResult<CreateLoadBalancerResponse> {
            self.answer("create_load_balancer")?;
            let dns_name = format!("{}-123.us-west-2.elb.amazonaws.com", request.load_balancer_name);
            self.create_lb.lock().push(request);
            Ok(CreateLoadBalancerResponse { dns_name })
        }

        async fn delete_load_balancer(&self, _request: DeleteLoadBalancerRequest) -> ProviderResult<()> {
            self.answer("delete_load_balancer")
        }

        async fn register_instances_with_load_balancer(
            &self,
            request: LoadBalancerInstancesRequest,
        ) -> ProviderResult<()> {
            self.answer("register")?;
            self.lb_instances.lock().push(request);
            Ok(())
        }

        async fn deregister_instances_from_load_balancer(
            &self,
            request: LoadBalancerInstancesRequest,
        ) -> ProviderResult<()> {
            self.answer("deregister")?;
            self.lb_instances.lock().push(request);
            Ok(())
        }
    }

    #[async_trait]
    impl DnsApi for FakeProvider {
        async fn change_resource_record_sets(
            &self,
            request: ChangeResourceRecordSetsRequest,
        ) -> ProviderResult<ChangeInfo> {
            self.answer("change_resource_record_sets")?;
            self.changes.lock().push(request);
            Ok(ChangeInfo {
                id: "/change/C1".to_string(),
                status: "PENDING".to_string(),
            })
        }
    }

    #[async_trait]
    impl Ec2Api for FakeProvider {
        async fn run_instances(&self, request: RunInstancesRequest) -> ProviderResult<RunInstancesResponse> {
            self.answer("run_instances")?;
            let instances = (0..request.max_count)
                .map(|n| Instance {
                    instance_id: format!("i-{n}"),
                })
                .collect();
            self.runs.lock().push(request);
            Ok(RunInstancesResponse { instances })
        }

        async fn start_instances(&self, _request: InstanceIdsRequest) -> ProviderResult<()> {
            self.answer("start_instances")
        }

        async fn stop_instances(&self, _request: InstanceIdsRequest) -> ProviderResult<()> {
            self.answer("stop_instances")
        }

        async fn describe_instances(
            &self,
            request: DescribeInstancesRequest,
        ) -> ProviderResult<DescribeInstancesResponse> {
            self.answer("describe_instances")?;
            self.describes.lock().push(request);
            Ok(DescribeInstancesResponse {
                reservations: self.reservations.clone(),
            })
        }

        async fn create_tags(&self, request: TagsRequest) -> ProviderResult<()> {
            self.answer("create_tags")?;
            self.tags.lock().push(request);
            Ok(())
        }

        async fn delete_tags(&self, request: TagsRequest) -> ProviderResult<()> {
            self.answer("delete_tags")?;
            self.tags.lock().push(request);
            Ok(())
        }
    }

    struct FakeFactory(Arc<FakeProvider>);

    impl ProviderFactory for FakeFactory {
        fn clients(&self, config: &ProviderConfig) -> ProviderResult<ProviderClients> {
            if config.region.is_empty() {
                return Err(ProviderError::rejected("InvalidRegion", "region is required"));
            }
            Ok(clients(&self.0))
        }
    }

    fn clients(provider: &Arc<FakeProvider>) -> ProviderClients {
        ProviderClients {
            elb: provider.clone(),
            dns: provider.clone(),
            ec2: provider.clone(),
        }
    }

    fn service(provider: &Arc<FakeProvider>) -> RealResourceService {
        RealResourceService::new(ProviderConfig::for_region("us-west-2"), clients(provider))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn web_lb() -> LoadBalancerDefinition {
        LoadBalancerDefinition::new("web")
            .with_listener(ElbListener::new("HTTP", 80, 8080))
            .with_listener(ElbListener::new("HTTPS", 443, 8443).with_certificate("arn:cert/web"))
            .with_security_groups(["sg-1"])
            .with_subnets(["subnet-a", "subnet-b"])
    }

    #[test]
    fn test_translate_listeners_preserves_order_and_values() {
        let lb = web_lb();
        let listeners = translate_listeners(&lb.listeners);

        assert_eq!(listeners.len(), 2);
        assert_eq!(listeners[0].load_balancer_port, 80);
        assert_eq!(listeners[0].instance_port, 8080);
        assert_eq!(listeners[0].protocol, "HTTP");
        assert_eq!(listeners[0].ssl_certificate_id, None);
        assert_eq!(listeners[1].load_balancer_port, 443);
        assert_eq!(listeners[1].ssl_certificate_id.as_deref(), Some("arn:cert/web"));
    }

    #[test]
    fn test_translated_listeners_do_not_alias() {
        let lb = LoadBalancerDefinition::new("api")
            .with_listener(ElbListener::new("TCP", 9042, 9042))
            .with_listener(ElbListener::new("TCP", 7000, 7000));

        let mut listeners = translate_listeners(&lb.listeners);
        listeners[0].load_balancer_port = 1;
        listeners[0].protocol.push_str("-changed");

        assert_eq!(listeners[1].load_balancer_port, 7000);
        assert_eq!(listeners[1].protocol, "TCP");
        assert_eq!(lb.listeners[0].load_balancer_port, 9042);
        assert_eq!(lb.listeners[0].load_balancer_protocol, "TCP");
    }

    #[tokio::test]
    async fn test_create_load_balancer_returns_dns_name() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);

        let dns_name = svc.create_load_balancer(&web_lb()).await.unwrap();
        assert_eq!(dns_name, "web-123.us-west-2.elb.amazonaws.com");

        let sent = provider.create_lb.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].load_balancer_name, "web");
        assert_eq!(sent[0].subnets, ids(&["subnet-a", "subnet-b"]));
        assert_eq!(sent[0].security_groups, ids(&["sg-1"]));
        assert_eq!(sent[0].scheme, None);
        assert_eq!(sent[0].listeners.len(), 2);
    }

    #[tokio::test]
    async fn test_create_load_balancer_passes_scheme() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);

        svc.create_load_balancer(&web_lb().with_scheme("internal"))
            .await
            .unwrap();
        assert_eq!(provider.create_lb.lock()[0].scheme.as_deref(), Some("internal"));
    }

    #[tokio::test]
    async fn test_create_load_balancer_without_listeners_never_calls_provider() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);

        let err = svc
            .create_load_balancer(&LoadBalancerDefinition::new("empty"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidDefinition(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_register_and_deregister_map_ids() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);
        let instances = ids(&["i-1", "i-2"]);

        svc.register_instances("web", &instances).await.unwrap();
        svc.deregister_instances("web", &instances[..1]).await.unwrap();

        let sent = provider.lb_instances.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].load_balancer_name, "web");
        assert_eq!(
            sent[0].instances,
            vec![
                InstanceRef { instance_id: "i-1".into() },
                InstanceRef { instance_id: "i-2".into() },
            ]
        );
        assert_eq!(sent[1].instances.len(), 1);
    }

    #[tokio::test]
    async fn test_dns_records_use_single_change() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);
        let record = DnsRecordDefinition::new("Z123", "db.example.com", "CNAME", "web-123.elb", 300);

        svc.create_dns_record(&record).await.unwrap();
        svc.delete_dns_record(&record).await.unwrap();

        let sent = provider.changes.lock();
        assert_eq!(sent.len(), 2);
        for (request, action) in sent.iter().zip([ChangeAction::Create, ChangeAction::Delete]) {
            assert_eq!(request.hosted_zone_id, "Z123");
            assert_eq!(request.change_batch.changes.len(), 1);
            let change = &request.change_batch.changes[0];
            assert_eq!(change.action, action);
            assert_eq!(change.resource_record_set.name, "db.example.com");
            assert_eq!(change.resource_record_set.record_type, "CNAME");
            assert_eq!(change.resource_record_set.ttl, 300);
            assert_eq!(change.resource_record_set.resource_records, ids(&["web-123.elb"]));
        }
    }

    #[tokio::test]
    async fn test_run_instances_applies_root_volume_policy() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);
        let def = InstanceDefinition::new("ami-1", "m5.large", 3)
            .with_network("subnet-a", "sg-1")
            .with_keypair("ops")
            .with_user_data(b"#!/bin/sh\necho hi\n".to_vec())
            .with_root_size_gb(0);

        let launched = svc.run_instances(&def).await.unwrap();
        assert_eq!(launched, ids(&["i-0", "i-1", "i-2"]));

        let runs = provider.runs.lock();
        let request = &runs[0];
        assert_eq!(request.min_count, 3);
        assert_eq!(request.max_count, 3);
        assert_eq!(request.image_id, "ami-1");
        assert_eq!(request.key_name, "ops");
        assert_eq!(request.security_group_ids, ids(&["sg-1"]));
        assert_eq!(request.user_data, "IyEvYmluL3NoCmVjaG8gaGkK");

        let root = &request.block_device_mappings[0];
        assert_eq!(request.block_device_mappings.len(), 1);
        assert_eq!(root.device_name, "/dev/xvda");
        assert_eq!(root.ebs.volume_type, "gp2");
        assert_eq!(root.ebs.volume_size, i64::from(DEFAULT_ROOT_SIZE_GB));
        assert!(root.ebs.delete_on_termination);
        assert!(!root.ebs.encrypted);
    }

    #[test]
    fn test_run_request_keeps_explicit_root_size() {
        let def = InstanceDefinition::new("ami-1", "t3.micro", 1).with_root_size_gb(100);
        let request = run_request(&def);
        assert_eq!(request.block_device_mappings[0].ebs.volume_size, 100);
        assert_eq!(request.user_data, "");
    }

    #[tokio::test]
    async fn test_run_instances_rejects_zero_count() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);

        let err = svc
            .run_instances(&InstanceDefinition::new("ami-1", "t3.micro", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidDefinition(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_find_instances_by_tag_flattens_reservations() {
        let provider = Arc::new(FakeProvider {
            reservations: vec![
                Reservation {
                    instances: vec![
                        Instance { instance_id: "i-a".into() },
                        Instance { instance_id: "i-b".into() },
                    ],
                },
                Reservation::default(),
                Reservation {
                    instances: vec![Instance { instance_id: "i-c".into() }],
                },
            ],
            ..Default::default()
        });
        let svc = service(&provider);

        let found = svc.find_instances_by_tag("role", "cassandra").await.unwrap();
        assert_eq!(found, ids(&["i-a", "i-b", "i-c"]));

        let describes = provider.describes.lock();
        assert_eq!(
            describes[0].filters,
            vec![Filter {
                name: "tag:role".into(),
                values: ids(&["cassandra"]),
            }]
        );
    }

    #[tokio::test]
    async fn test_find_instances_by_tag_empty() {
        let provider = Arc::new(FakeProvider::default());
        let found = service(&provider)
            .find_instances_by_tag("role", "none")
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_tagging_sends_one_request_per_batch() {
        let provider = Arc::new(FakeProvider::default());
        let svc = service(&provider);
        let instances = ids(&["i-1", "i-2", "i-3"]);

        svc.tag_instances(&instances, "env", "prod").await.unwrap();
        svc.delete_tag(&instances, "env").await.unwrap();

        let tags = provider.tags.lock();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].resources, instances);
        assert_eq!(
            tags[0].tags,
            vec![Tag { key: "env".into(), value: Some("prod".into()) }]
        );
        assert_eq!(tags[1].tags, vec![Tag { key: "env".into(), value: None }]);
    }

    #[tokio::test]
    async fn test_rejection_is_wrapped_and_not_retried() {
        let provider = Arc::new(FakeProvider::failing(ProviderError::rejected(
            "LoadBalancerNotFound",
            "no such load balancer",
        )));
        let svc = service(&provider);

        let err = svc.delete_load_balancer("ghost").await.unwrap_err();
        match err {
            ResourceError::ProviderRejection { action, target, code, .. } => {
                assert_eq!(action, "DeleteLoadBalancer");
                assert_eq!(target, "ghost");
                assert_eq!(code, "LoadBalancerNotFound");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_is_wrapped() {
        let provider = Arc::new(FakeProvider::failing(ProviderError::Connection(
            "connection reset".into(),
        )));
        let svc = service(&provider);

        let err = svc.stop_instances(&ids(&["i-1", "i-2"])).await.unwrap_err();
        match err {
            ResourceError::Connection { action, target, reason } => {
                assert_eq!(action, "StopInstances");
                assert_eq!(target, "[i-1 i-2]");
                assert_eq!(reason, "connection reset");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_connect_uses_explicit_config() {
        let provider = Arc::new(FakeProvider::default());
        let factory = FakeFactory(provider);

        let svc = RealResourceService::connect(ProviderConfig::for_region("eu-west-1"), &factory)
            .unwrap();
        assert_eq!(svc.region(), "eu-west-1");

        let err = RealResourceService::connect(ProviderConfig::for_region(""), &factory).unwrap_err();
        assert_eq!(err.action(), Some("Connect"));
    }
}
