//! Keel Resources - capability facade for cloud resources
//!
//! Each resource family is a small capability trait:
//!
//! - **LoadBalancerService**: create, delete, register and deregister instances
//! - **DnsService**: create and delete records
//! - **ComputeService**: run, start, stop, find by tag, tag and untag instances
//!
//! [`ResourceService`] groups load balancers and DNS, which is what most
//! callers hold. Compute is a separate capability and is never assumed to be
//! part of that group.
//!
//! Two implementations exist for every trait:
//!
//! - [`RealResourceService`] translates definitions into provider requests and
//!   forwards each call once. It keeps no state, never retries and never reads
//!   back after a write; success means the provider accepted the request.
//! - [`RecordingTestService`] performs no I/O. Every call appends one
//!   [`ActionLogEntry`] and returns an empty success value, so tests can
//!   assert on what was asked for without credentials or a network.
//!
//! ## Usage
//!
//! ```no_run
//! use keel_resources::{LoadBalancerService, RecordingTestService};
//! use keel_types::{ElbListener, LoadBalancerDefinition};
//!
//! # async fn example() -> keel_resources::Result<()> {
//! let service = RecordingTestService::new();
//! let lb = LoadBalancerDefinition::new("web")
//!     .with_listener(ElbListener::new("HTTP", 80, 8080))
//!     .with_subnets(["subnet-a", "subnet-b"]);
//!
//! service.create_load_balancer(&lb).await?;
//! assert_eq!(service.count("CreateLoadBalancer"), 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod provider;
pub mod real;
pub mod recording;
pub mod service;

// Re-exports
pub use error::{ProviderError, ResourceError, Result};
pub use provider::{DnsApi, Ec2Api, ElbApi, ProviderClients, ProviderFactory};
pub use real::RealResourceService;
pub use recording::{ActionLogEntry, RecordingTestService};
pub use service::{ComputeService, DnsService, LoadBalancerService, ResourceService};
