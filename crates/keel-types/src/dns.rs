//! DNS record definitions

use serde::{Deserialize, Serialize};

/// Desired state of a single DNS record in a hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordDefinition {
    pub zone_id: String,

    /// Fully qualified record name
    pub name: String,

    /// Record value (address, target host, text)
    pub value: String,

    /// Record type (A, CNAME, TXT ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time to live in seconds
    pub ttl: u64,
}

impl DnsRecordDefinition {
    pub fn new(
        zone_id: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        ttl: u64,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            name: name.into(),
            value: value.into(),
            record_type: record_type.into(),
            ttl,
        }
    }
}
