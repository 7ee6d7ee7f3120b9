//! Recording test double
//!
//! Implements every capability trait without touching a provider. Each call
//! appends one [`ActionLogEntry`] and returns an empty success value.

use std::collections::BTreeMap;

use async_trait::async_trait;
use keel_types::{DnsRecordDefinition, ElbListener, InstanceDefinition, LoadBalancerDefinition};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::service::{ComputeService, DnsService, LoadBalancerService};

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// PascalCase action name, e.g. `CreateLoadBalancer`
    pub action: String,

    /// Notable parameters flattened to strings
    pub notable_params: BTreeMap<String, String>,
}

impl ActionLogEntry {
    pub fn new<K, V>(action: impl Into<String>, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            action: action.into(),
            notable_params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.notable_params.get(key).map(String::as_str)
    }
}

/// Capability implementation that only records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingTestService {
    log: Mutex<Vec<ActionLogEntry>>,
}

impl RecordingTestService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry in call order
    pub fn log(&self) -> Vec<ActionLogEntry> {
        self.log.lock().clone()
    }

    pub fn entries_for(&self, action: &str) -> Vec<ActionLogEntry> {
        self.log
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.log.lock().iter().filter(|e| e.action == action).count()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    fn record<const N: usize>(&self, action: &str, params: [(&str, String); N]) {
        trace!(action, "Recorded action");
        self.log.lock().push(ActionLogEntry::new(action, params));
    }
}

fn list(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}

fn listener_list(listeners: &[ElbListener]) -> String {
    let rendered: Vec<String> = listeners
        .iter()
        .map(|l| {
            let mut rendered = format!(
                "{}:{}->{}:{}",
                l.load_balancer_protocol, l.load_balancer_port, l.instance_protocol, l.instance_port
            );
            if l.has_certificate() {
                rendered.push('@');
                rendered.push_str(&l.certificate_id);
            }
            rendered
        })
        .collect();
    list(&rendered)
}

#[async_trait]
impl LoadBalancerService for RecordingTestService {
    async fn create_load_balancer(&self, definition: &LoadBalancerDefinition) -> Result<String> {
        self.record(
            "CreateLoadBalancer",
            [
                ("name", definition.name.clone()),
                ("scheme", definition.scheme.clone()),
                ("security_groups", list(&definition.security_groups)),
                ("subnets", list(&definition.subnets)),
                ("listeners", listener_list(&definition.listeners)),
            ],
        );
        // Logged even when invalid so tests can see the attempt
        definition.validate()?;
        Ok(String::new())
    }

    async fn delete_load_balancer(&self, name: &str) -> Result<()> {
        self.record("DeleteLoadBalancer", [("name", name.to_string())]);
        Ok(())
    }

    async fn register_instances(&self, name: &str, instance_ids: &[String]) -> Result<()> {
        self.record(
            "RegisterInstances",
            [("name", name.to_string()), ("ids", list(instance_ids))],
        );
        Ok(())
    }

    async fn deregister_instances(&self, name: &str, instance_ids: &[String]) -> Result<()> {
        self.record(
            "DeregisterInstances",
            [("name", name.to_string()), ("ids", list(instance_ids))],
        );
        Ok(())
    }
}

fn record_params(record: &DnsRecordDefinition) -> [(&'static str, String); 5] {
    [
        ("zone_id", record.zone_id.clone()),
        ("name", record.name.clone()),
        ("value", record.value.clone()),
        ("type", record.record_type.clone()),
        ("ttl", record.ttl.to_string()),
    ]
}

#[async_trait]
impl DnsService for RecordingTestService {
    async fn create_dns_record(&self, record: &DnsRecordDefinition) -> Result<()> {
        self.record("CreateDNSRecord", record_params(record));
        Ok(())
    }

    async fn delete_dns_record(&self, record: &DnsRecordDefinition) -> Result<()> {
        self.record("DeleteDNSRecord", record_params(record));
        Ok(())
    }
}

#[async_trait]
impl ComputeService for RecordingTestService {
    async fn run_instances(&self, definition: &InstanceDefinition) -> Result<Vec<String>> {
        self.record(
            "RunInstances",
            [
                ("ami", definition.ami.clone()),
                ("subnet", definition.subnet.clone()),
                ("security_group", definition.security_group.clone()),
                ("keypair", definition.keypair.clone()),
                ("type", definition.instance_type.clone()),
                ("count", definition.count.to_string()),
                ("root_size_gb", definition.effective_root_size_gb().to_string()),
                ("user_data_len", definition.user_data.len().to_string()),
            ],
        );
        definition.validate()?;
        Ok(Vec::new())
    }

    async fn start_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.record("StartInstances", [("ids", list(instance_ids))]);
        Ok(())
    }

    async fn stop_instances(&self, instance_ids: &[String]) -> Result<()> {
        self.record("StopInstances", [("ids", list(instance_ids))]);
        Ok(())
    }

    async fn find_instances_by_tag(&self, key: &str, value: &str) -> Result<Vec<String>> {
        self.record(
            "FindInstancesByTag",
            [("key", key.to_string()), ("value", value.to_string())],
        );
        Ok(Vec::new())
    }

    async fn tag_instances(&self, instance_ids: &[String], key: &str, value: &str) -> Result<()> {
        self.record(
            "TagInstances",
            [
                ("ids", list(instance_ids)),
                ("key", key.to_string()),
                ("value", value.to_string()),
            ],
        );
        Ok(())
    }

    async fn delete_tag(&self, instance_ids: &[String], key: &str) -> Result<()> {
        self.record(
            "DeleteTag",
            [("ids", list(instance_ids)), ("key", key.to_string())],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_load_balancer_is_recorded() {
        let service = RecordingTestService::new();
        let lb = LoadBalancerDefinition::new("lb1")
            .with_listener(ElbListener::new("HTTP", 80, 8080))
            .with_subnets(["s1", "s2"]);

        let dns_name = service.create_load_balancer(&lb).await.unwrap();
        assert_eq!(dns_name, "");

        let log = service.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "CreateLoadBalancer");
        assert_eq!(log[0].param("name"), Some("lb1"));
        assert_eq!(log[0].param("subnets"), Some("[s1 s2]"));
        assert_eq!(log[0].param("security_groups"), Some("[]"));
        assert_eq!(log[0].param("listeners"), Some("[HTTP:80->HTTP:8080]"));
    }

    #[tokio::test]
    async fn test_invalid_load_balancer_is_logged_then_rejected() {
        let service = RecordingTestService::new();
        let err = service
            .create_load_balancer(&LoadBalancerDefinition::new("bare"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidDefinition(_)));
        assert_eq!(service.count("CreateLoadBalancer"), 1);
        assert_eq!(service.log()[0].param("listeners"), Some("[]"));
    }

    #[tokio::test]
    async fn test_zero_instance_count_is_logged_then_rejected() {
        let service = RecordingTestService::new();
        let err = service
            .run_instances(&InstanceDefinition::new("ami-1", "m5.large", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::InvalidDefinition(_)));
        assert_eq!(service.count("RunInstances"), 1);
        assert_eq!(service.log()[0].param("count"), Some("0"));
    }

    #[tokio::test]
    async fn test_listener_certificate_rendered() {
        let service = RecordingTestService::new();
        let lb = LoadBalancerDefinition::new("web")
            .with_listener(ElbListener::new("HTTP", 80, 8080))
            .with_listener(ElbListener::new("HTTPS", 443, 8443).with_certificate("arn:cert/web"));

        service.create_load_balancer(&lb).await.unwrap();
        assert_eq!(
            service.log()[0].param("listeners"),
            Some("[HTTP:80->HTTP:8080 HTTPS:443->HTTPS:8443@arn:cert/web]")
        );
    }

    #[tokio::test]
    async fn test_every_call_appends_one_entry() {
        let service = RecordingTestService::new();
        let instances = ids(&["i-1", "i-2"]);
        let record = DnsRecordDefinition::new("Z1", "db.example.com", "A", "10.0.0.1", 60);

        service.register_instances("lb1", &instances).await.unwrap();
        service.deregister_instances("lb1", &instances).await.unwrap();
        service.delete_load_balancer("lb1").await.unwrap();
        service.create_dns_record(&record).await.unwrap();
        service.delete_dns_record(&record).await.unwrap();
        service.start_instances(&instances).await.unwrap();
        service.stop_instances(&instances).await.unwrap();
        service.tag_instances(&instances, "env", "prod").await.unwrap();
        service.delete_tag(&instances, "env").await.unwrap();
        let found = service.find_instances_by_tag("env", "prod").await.unwrap();
        assert!(found.is_empty());

        let actions: Vec<String> = service.log().into_iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                "RegisterInstances",
                "DeregisterInstances",
                "DeleteLoadBalancer",
                "CreateDNSRecord",
                "DeleteDNSRecord",
                "StartInstances",
                "StopInstances",
                "TagInstances",
                "DeleteTag",
                "FindInstancesByTag",
            ]
        );

        let dns = &service.entries_for("CreateDNSRecord")[0];
        assert_eq!(dns.param("zone_id"), Some("Z1"));
        assert_eq!(dns.param("type"), Some("A"));
        assert_eq!(dns.param("ttl"), Some("60"));

        let tag = &service.entries_for("TagInstances")[0];
        assert_eq!(tag.param("ids"), Some("[i-1 i-2]"));
        assert_eq!(tag.param("value"), Some("prod"));
    }

    #[tokio::test]
    async fn test_run_instances_records_effective_root_size() {
        let service = RecordingTestService::new();
        let def = InstanceDefinition::new("ami-1", "m5.large", 2)
            .with_network("subnet-a", "sg-1")
            .with_user_data(b"hello".to_vec());

        let launched = service.run_instances(&def).await.unwrap();
        assert!(launched.is_empty());

        let entry = &service.entries_for("RunInstances")[0];
        assert_eq!(entry.param("count"), Some("2"));
        assert_eq!(entry.param("root_size_gb"), Some("20"));
        assert_eq!(entry.param("user_data_len"), Some("5"));
        assert_eq!(entry.param("subnet"), Some("subnet-a"));
    }

    #[tokio::test]
    async fn test_clear_and_counts() {
        let service = RecordingTestService::new();
        assert!(service.is_empty());

        service.start_instances(&ids(&["i-1"])).await.unwrap();
        service.start_instances(&ids(&["i-2"])).await.unwrap();
        service.stop_instances(&ids(&["i-1"])).await.unwrap();

        assert_eq!(service.len(), 3);
        assert_eq!(service.count("StartInstances"), 2);
        assert_eq!(service.count("CreateLoadBalancer"), 0);

        service.clear();
        assert!(service.is_empty());
        assert!(service.entries_for("StartInstances").is_empty());
    }

    #[test]
    fn test_entry_serializes_params_in_key_order() {
        let entry = ActionLogEntry::new("DeleteTag", [("key", "env"), ("ids", "[i-1]")]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"action":"DeleteTag","notable_params":{"ids":"[i-1]","key":"env"}}"#
        );
    }
}
