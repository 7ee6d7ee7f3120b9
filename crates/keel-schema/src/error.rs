//! Schema error types

use thiserror::Error;

/// Errors reported by a column-store session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No node could be reached
    #[error("no hosts available: {0}")]
    Unavailable(String),

    /// The store refused the statement
    #[error("statement rejected: {0}")]
    Rejected(String),
}

/// Schema reconciliation errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Could not open session to {contact_points}: {source}")]
    Connection {
        contact_points: String,
        #[source]
        source: SessionError,
    },

    #[error("Reading {what} failed: {source}")]
    Read {
        what: String,
        #[source]
        source: SessionError,
    },

    #[error("Creating {entity} failed: {source}")]
    Write {
        entity: String,
        #[source]
        source: SessionError,
    },

    #[error("Reconciliation stopped at {failed} after creating {applied:?}: {source}")]
    PartialApply {
        applied: Vec<String>,
        failed: String,
        #[source]
        source: SessionError,
    },

    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid replication factor '{value}' for keyspace {keyspace}")]
    InvalidReplicationFactor { keyspace: String, value: String },

    #[error("No keyspace selected")]
    NoKeyspaceSelected,
}

impl SchemaError {
    /// Whether the error came from failing to reach the cluster
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            SchemaError::Connection { .. }
                | SchemaError::Read {
                    source: SessionError::Unavailable(_),
                    ..
                }
                | SchemaError::Write {
                    source: SessionError::Unavailable(_),
                    ..
                }
                | SchemaError::PartialApply {
                    source: SessionError::Unavailable(_),
                    ..
                }
        )
    }
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
