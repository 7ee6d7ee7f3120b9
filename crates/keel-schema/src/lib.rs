//! Keel Schema - column-store schema reconciliation
//!
//! The [`SchemaReconciler`] brings a cluster's live keyspaces, user-defined
//! types and tables into agreement with a desired schema:
//!
//! 1. read the live names from the system catalog,
//! 2. compute desired-minus-live, keeping the desired order,
//! 3. issue one `CREATE ... IF NOT EXISTS` per missing entity.
//!
//! Reconciliation only creates. Entities that exist but are not desired are
//! left alone, and a failure part-way through leaves earlier creations in
//! place. Because every call re-reads live state, repeating a call that
//! succeeded issues no writes at all.
//!
//! The wire driver is abstracted behind [`SessionConnector`] and
//! [`CqlSession`]; [`InMemoryCluster`] implements both for tests and dry runs.
//!
//! ## Usage
//!
//! ```no_run
//! use keel_schema::{ClusterConfig, InMemoryCluster, SchemaReconciler};
//! use keel_types::{CTable, Udt};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cluster = Arc::new(InMemoryCluster::new());
//! let mut reconciler = SchemaReconciler::new(ClusterConfig::default(), cluster);
//!
//! reconciler.create_keyspace("inventory", "3").await?;
//! reconciler
//!     .create_required_types(&[Udt::new("address", ["street text", "city text"])])
//!     .await?;
//! reconciler
//!     .create_required_tables(&[CTable::new("users", ["id uuid PRIMARY KEY", "home frozen<address>"])])
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod memory;
pub mod reconciler;
pub mod session;
pub mod statements;

// Re-exports
pub use error::{Result, SchemaError, SessionError};
pub use memory::InMemoryCluster;
pub use reconciler::{ManifestReport, ReconcileReport, SchemaReconciler};
pub use session::{ClusterConfig, CqlSession, SessionConnector};
pub use statements::SchemaEntity;
