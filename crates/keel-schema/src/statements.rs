//! CQL statement rendering and identifier checks

use crate::error::{Result, SchemaError};
use keel_types::{CTable, Udt};

/// Catalog query for table names in a keyspace
pub const SELECT_TABLES: &str = "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?;";

/// Catalog query for user-defined type names in a keyspace
pub const SELECT_TYPES: &str = "SELECT type_name FROM system_schema.types WHERE keyspace_name = ?;";

/// Catalog query for keyspace names
pub const SELECT_KEYSPACES: &str = "SELECT keyspace_name FROM system_schema.keyspaces;";

/// A desired entity that can be created with a single statement
pub trait SchemaEntity {
    /// Catalog kind, used in log and error messages
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn create_statement(&self) -> String;
}

impl SchemaEntity for CTable {
    const KIND: &'static str = "table";

    fn name(&self) -> &str {
        &self.name
    }

    fn create_statement(&self) -> String {
        create_table(self)
    }
}

impl SchemaEntity for Udt {
    const KIND: &'static str = "type";

    fn name(&self) -> &str {
        &self.name
    }

    fn create_statement(&self) -> String {
        create_type(self)
    }
}

pub fn create_table(table: &CTable) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} ( {} );",
        table.name,
        table.columns.join(", ")
    )
}

pub fn create_type(udt: &Udt) -> String {
    format!(
        "CREATE TYPE IF NOT EXISTS {} ( {} );",
        udt.name,
        udt.columns.join(", ")
    )
}

pub fn create_keyspace(keyspace: &str, replication_factor: u32) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = {{'class': 'SimpleStrategy', 'replication_factor': {}}};",
        keyspace, replication_factor
    )
}

pub fn drop_keyspace(keyspace: &str) -> String {
    format!("DROP KEYSPACE IF EXISTS {};", keyspace)
}

fn is_simple_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Check a keyspace name
pub fn validate_keyspace_name(name: &str) -> Result<()> {
    if is_simple_identifier(name) {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

/// Check a table or type name, optionally keyspace-qualified
pub fn validate_entity_name(name: &str) -> Result<()> {
    let valid = match name.split_once('.') {
        Some((keyspace, entity)) => is_simple_identifier(keyspace) && is_simple_identifier(entity),
        None => is_simple_identifier(name),
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier(name.to_string()))
    }
}

/// Parse a replication factor given as text
pub fn parse_replication_factor(keyspace: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(rf) if rf > 0 => Ok(rf),
        _ => Err(SchemaError::InvalidReplicationFactor {
            keyspace: keyspace.to_string(),
            value: value.to_string(),
        }),
    }
}
