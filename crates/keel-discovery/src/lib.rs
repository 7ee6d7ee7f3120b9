//! Keel Discovery - column-store contact point discovery
//!
//! - **ServiceRegistry**: healthy members of a named service, nearest first
//! - **ConsulRegistry**: the registry agent's health endpoint over HTTP
//! - **InMemoryServiceRegistry**: registry for development and tests
//! - **NodeDiscovery**: the member addresses a session is built from
//!
//! Discovery is independent of schema reconciliation. It runs before a
//! session is constructed and only decides which nodes to contact.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod consul;
pub mod error;
pub mod memory;
pub mod nodes;
pub mod registry;

// Re-exports
pub use consul::ConsulRegistry;
pub use error::{DiscoveryError, Result};
pub use memory::InMemoryServiceRegistry;
pub use nodes::{resolve_contact_points, NodeDiscovery, CASSANDRA_SERVICE};
pub use registry::{ServiceEntry, ServiceRegistry, NEAR_AGENT};
