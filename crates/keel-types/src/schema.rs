//! Column-store schema entities
//!
//! A table or user-defined type is just a name plus the clause strings that
//! go between the parentheses of its `CREATE` statement. Clauses are kept
//! verbatim and in order; `"PRIMARY KEY (id)"` is a clause like any column.

use crate::error::{DefinitionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Desired table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CTable {
    pub name: String,
    pub columns: Vec<String>,
}

impl CTable {
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Desired user-defined type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Udt {
    pub name: String,
    pub columns: Vec<String>,
}

impl Udt {
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A keyspace with its types and tables, as kept in a YAML or JSON file
///
/// Types are listed separately from tables because they have to exist
/// before any table that references them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaManifest {
    pub keyspace: String,

    #[serde(default = "default_replication_factor")]
    pub replication_factor: u32,

    #[serde(default)]
    pub types: Vec<Udt>,

    #[serde(default)]
    pub tables: Vec<CTable>,
}

fn default_replication_factor() -> u32 {
    1
}

impl SchemaManifest {
    pub fn new(keyspace: impl Into<String>, replication_factor: u32) -> Self {
        Self {
            keyspace: keyspace.into(),
            replication_factor,
            types: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn with_type(mut self, udt: Udt) -> Self {
        self.types.push(udt);
        self
    }

    pub fn with_table(mut self, table: CTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Parse a manifest from YAML (JSON is accepted too, being a YAML subset)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| DefinitionError::Manifest(e.to_string()))
    }

    /// Read and parse a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}
