//! Compute instance definitions

use crate::error::{DefinitionError, Result};
use serde::{Deserialize, Serialize};

/// Root volume size used when a definition leaves it unset (or zero)
pub const DEFAULT_ROOT_SIZE_GB: u32 = 20;

/// Volume type of every root volume
pub const ROOT_VOLUME_TYPE: &str = "gp2";

/// Device the root volume is attached as
pub const ROOT_DEVICE_NAME: &str = "/dev/xvda";

/// Desired state of a batch of identical instances
///
/// The root volume policy is not configurable beyond its size: the volume is
/// always `gp2`, unencrypted and deleted on termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDefinition {
    /// Machine image id
    pub ami: String,

    pub subnet: String,

    pub security_group: String,

    pub keypair: String,

    #[serde(rename = "type")]
    pub instance_type: String,

    /// Raw user data; base64 encoded on the wire
    #[serde(default, with = "base64_bytes")]
    pub user_data: Vec<u8>,

    pub count: u32,

    #[serde(default = "default_root_size_gb")]
    pub root_size_gb: u32,
}

fn default_root_size_gb() -> u32 {
    DEFAULT_ROOT_SIZE_GB
}

impl InstanceDefinition {
    pub fn new(ami: impl Into<String>, instance_type: impl Into<String>, count: u32) -> Self {
        Self {
            ami: ami.into(),
            subnet: String::new(),
            security_group: String::new(),
            keypair: String::new(),
            instance_type: instance_type.into(),
            user_data: Vec::new(),
            count,
            root_size_gb: DEFAULT_ROOT_SIZE_GB,
        }
    }

    pub fn with_network(mut self, subnet: impl Into<String>, security_group: impl Into<String>) -> Self {
        self.subnet = subnet.into();
        self.security_group = security_group.into();
        self
    }

    pub fn with_keypair(mut self, keypair: impl Into<String>) -> Self {
        self.keypair = keypair.into();
        self
    }

    pub fn with_user_data(mut self, user_data: impl Into<Vec<u8>>) -> Self {
        self.user_data = user_data.into();
        self
    }

    pub fn with_root_size_gb(mut self, size: u32) -> Self {
        self.root_size_gb = size;
        self
    }

    /// Root volume size after applying the default for zero
    pub fn effective_root_size_gb(&self) -> u32 {
        if self.root_size_gb == 0 {
            DEFAULT_ROOT_SIZE_GB
        } else {
            self.root_size_gb
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ami.is_empty() {
            return Err(DefinitionError::MissingImage);
        }
        if self.count == 0 {
            return Err(DefinitionError::InvalidInstanceCount {
                ami: self.ami.clone(),
                count: self.count,
            });
        }
        Ok(())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_size_defaults() {
        let json = r#"{"ami":"ami-1","subnet":"s","security_group":"sg","keypair":"k","type":"t3.micro","count":1}"#;
        let def: InstanceDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.root_size_gb, DEFAULT_ROOT_SIZE_GB);
        assert!(def.user_data.is_empty());

        let zero = def.clone().with_root_size_gb(0);
        assert_eq!(zero.effective_root_size_gb(), 20);
        assert_eq!(def.with_root_size_gb(100).effective_root_size_gb(), 100);
    }

    #[test]
    fn test_user_data_is_base64_on_the_wire() {
        let def = InstanceDefinition::new("ami-1", "t3.micro", 2).with_user_data(b"#!/bin/sh\n".to_vec());
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["user_data"], "IyEvYmluL3NoCg==");

        let back: InstanceDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back.user_data, b"#!/bin/sh\n");
    }

    #[test]
    fn test_validate() {
        assert!(InstanceDefinition::new("ami-1", "t3.micro", 1).validate().is_ok());
        assert!(matches!(
            InstanceDefinition::new("ami-1", "t3.micro", 0).validate(),
            Err(DefinitionError::InvalidInstanceCount { count: 0, .. })
        ));
        assert!(matches!(
            InstanceDefinition::new("", "t3.micro", 1).validate(),
            Err(DefinitionError::MissingImage)
        ));
    }
}
