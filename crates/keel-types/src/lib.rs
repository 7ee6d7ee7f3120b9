//! Keel Types - desired-state definitions
//!
//! Every type in this crate is an immutable value describing what a caller
//! wants to exist. Nothing here talks to a provider; the adapters in
//! `keel-resources` and the reconciler in `keel-schema` consume these values.
//!
//! - **Load balancers**: [`LoadBalancerDefinition`] and its ordered [`ElbListener`]s
//! - **DNS**: [`DnsRecordDefinition`]
//! - **Compute**: [`InstanceDefinition`] with the fixed root-volume policy
//! - **Schema**: [`CTable`], [`Udt`] and the file-backed [`SchemaManifest`]

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod compute;
pub mod dns;
pub mod error;
pub mod load_balancer;
pub mod schema;

// Re-exports
pub use compute::{
    InstanceDefinition, DEFAULT_ROOT_SIZE_GB, ROOT_DEVICE_NAME, ROOT_VOLUME_TYPE,
};
pub use dns::DnsRecordDefinition;
pub use error::{DefinitionError, Result};
pub use load_balancer::{ElbListener, LoadBalancerDefinition};
pub use schema::{CTable, SchemaManifest, Udt};
