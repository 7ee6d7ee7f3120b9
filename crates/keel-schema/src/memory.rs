//! In-memory cluster
//!
//! Implements [`SessionConnector`] by interpreting the statements the
//! reconciler issues and answering the catalog queries it reads. Suitable
//! for development, dry runs and tests; every successful write statement is
//! recorded for inspection. Unquoted identifiers fold to lowercase the way
//! the real catalog stores them.

use crate::error::SessionError;
use crate::session::{ClusterConfig, CqlSession, SessionConnector};
use crate::statements::{SELECT_KEYSPACES, SELECT_TABLES, SELECT_TYPES};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

const SYSTEM_KEYSPACES: [&str; 3] = ["system", "system_auth", "system_schema"];

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[derive(Debug, Default)]
struct KeyspaceState {
    replication_factor: u32,
    tables: Vec<String>,
    types: Vec<String>,
}

#[derive(Debug, Default)]
struct ClusterState {
    keyspaces: BTreeMap<String, KeyspaceState>,
    statements: Vec<String>,
    fail_on: Vec<String>,
    fail_connect: bool,
}

impl ClusterState {
    fn check_failure(&self, statement: &str) -> Result<(), SessionError> {
        match self.fail_on.iter().find(|p| statement.contains(p.as_str())) {
            Some(pattern) => Err(SessionError::Rejected(format!(
                "injected failure matching '{}'",
                pattern
            ))),
            None => Ok(()),
        }
    }

    fn keyspace_mut(&mut self, name: &str) -> Result<&mut KeyspaceState, SessionError> {
        self.keyspaces
            .get_mut(name)
            .ok_or_else(|| SessionError::Rejected(format!("Keyspace '{}' does not exist", name)))
    }
}

/// In-memory column-store cluster
pub struct InMemoryCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl InMemoryCluster {
    /// Empty cluster holding only the system keyspaces
    pub fn new() -> Self {
        let mut state = ClusterState::default();
        for name in SYSTEM_KEYSPACES {
            state.keyspaces.insert(
                name.to_string(),
                KeyspaceState {
                    replication_factor: 1,
                    ..Default::default()
                },
            );
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Add a keyspace without recording a statement
    pub fn with_keyspace(self, name: &str, replication_factor: u32) -> Self {
        self.state.lock().keyspaces.insert(
            fold(name),
            KeyspaceState {
                replication_factor,
                ..Default::default()
            },
        );
        self
    }

    /// Add a table without recording a statement, creating the keyspace if needed
    pub fn seed_table(&self, keyspace: &str, table: &str) {
        let mut state = self.state.lock();
        let ks = state.keyspaces.entry(fold(keyspace)).or_default();
        let table = fold(table);
        if !ks.tables.contains(&table) {
            ks.tables.push(table);
        }
    }

    /// Add a user-defined type without recording a statement
    pub fn seed_type(&self, keyspace: &str, udt: &str) {
        let mut state = self.state.lock();
        let ks = state.keyspaces.entry(fold(keyspace)).or_default();
        let udt = fold(udt);
        if !ks.types.contains(&udt) {
            ks.types.push(udt);
        }
    }

    /// Successful write statements, in execution order
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().statements.len()
    }

    pub fn clear_statements(&self) {
        self.state.lock().statements.clear();
    }

    pub fn keyspaces(&self) -> Vec<String> {
        self.state.lock().keyspaces.keys().cloned().collect()
    }

    pub fn replication_factor(&self, keyspace: &str) -> Option<u32> {
        self.state
            .lock()
            .keyspaces
            .get(&fold(keyspace))
            .map(|ks| ks.replication_factor)
    }

    pub fn tables(&self, keyspace: &str) -> Vec<String> {
        self.state
            .lock()
            .keyspaces
            .get(&fold(keyspace))
            .map(|ks| ks.tables.clone())
            .unwrap_or_default()
    }

    pub fn types(&self, keyspace: &str) -> Vec<String> {
        self.state
            .lock()
            .keyspaces
            .get(&fold(keyspace))
            .map(|ks| ks.types.clone())
            .unwrap_or_default()
    }

    /// Reject every statement or query containing `pattern`
    pub fn fail_on(&self, pattern: &str) {
        self.state.lock().fail_on.push(pattern.to_string());
    }

    pub fn clear_failures(&self) {
        self.state.lock().fail_on.clear();
    }

    /// Make every connection attempt fail
    pub fn fail_connect(&self, fail: bool) {
        self.state.lock().fail_connect = fail;
    }
}

impl Default for InMemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionConnector for InMemoryCluster {
    async fn connect(&self, config: &ClusterConfig) -> Result<Box<dyn CqlSession>, SessionError> {
        let state = self.state.lock();
        if state.fail_connect {
            return Err(SessionError::Unavailable(config.endpoints()));
        }
        if let Some(ref keyspace) = config.keyspace {
            if !state.keyspaces.contains_key(&fold(keyspace)) {
                return Err(SessionError::Rejected(format!(
                    "Keyspace '{}' does not exist",
                    keyspace
                )));
            }
        }
        Ok(Box::new(InMemorySession {
            state: self.state.clone(),
            keyspace: config.keyspace.as_deref().map(fold),
        }))
    }
}

struct InMemorySession {
    state: Arc<Mutex<ClusterState>>,
    keyspace: Option<String>,
}

/// Leading identifier of `rest`, stopping at whitespace, `(` or `;`
fn leading_name(rest: &str) -> &str {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .unwrap_or(rest.len());
    &rest[..end]
}

impl InMemorySession {
    fn qualify<'a>(&'a self, name: &'a str) -> Result<(&'a str, &'a str), SessionError> {
        match name.split_once('.') {
            Some(qualified) => Ok(qualified),
            None => self
                .keyspace
                .as_deref()
                .map(|ks| (ks, name))
                .ok_or_else(|| SessionError::Rejected("No keyspace has been specified".to_string())),
        }
    }

    fn apply(&self, state: &mut ClusterState, statement: &str) -> Result<(), SessionError> {
        if let Some(rest) = statement.strip_prefix("CREATE TABLE IF NOT EXISTS ") {
            let name = fold(leading_name(rest));
            let (keyspace, table) = self.qualify(&name)?;
            let ks = state.keyspace_mut(keyspace)?;
            if !ks.tables.iter().any(|t| t == table) {
                ks.tables.push(table.to_string());
            }
        } else if let Some(rest) = statement.strip_prefix("CREATE TYPE IF NOT EXISTS ") {
            let name = fold(leading_name(rest));
            let (keyspace, udt) = self.qualify(&name)?;
            let ks = state.keyspace_mut(keyspace)?;
            if !ks.types.iter().any(|t| t == udt) {
                ks.types.push(udt.to_string());
            }
        } else if let Some(rest) = statement.strip_prefix("CREATE KEYSPACE IF NOT EXISTS ") {
            let name = fold(leading_name(rest));
            let replication_factor = rest
                .split_once("'replication_factor': ")
                .map(|(_, tail)| tail.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
                .and_then(|digits| digits.parse::<u32>().ok())
                .ok_or_else(|| SessionError::Rejected(format!("bad replication in: {}", statement)))?;
            state
                .keyspaces
                .entry(name)
                .or_insert_with(|| KeyspaceState {
                    replication_factor,
                    ..Default::default()
                });
        } else if let Some(rest) = statement.strip_prefix("DROP KEYSPACE IF EXISTS ") {
            state.keyspaces.remove(&fold(leading_name(rest)));
        } else {
            return Err(SessionError::Rejected(format!(
                "unsupported statement: {}",
                statement
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CqlSession for InMemorySession {
    async fn execute(&self, statement: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        state.check_failure(statement)?;
        self.apply(&mut state, statement)?;
        state.statements.push(statement.to_string());
        Ok(())
    }

    async fn query_column(&self, statement: &str, params: &[&str]) -> Result<Vec<String>, SessionError> {
        let state = self.state.lock();
        state.check_failure(statement)?;

        let keyspace = params.first().and_then(|ks| state.keyspaces.get(&fold(ks)));

        match statement {
            SELECT_KEYSPACES => Ok(state.keyspaces.keys().cloned().collect()),
            SELECT_TABLES => Ok(keyspace.map(|ks| ks.tables.clone()).unwrap_or_default()),
            SELECT_TYPES => Ok(keyspace.map(|ks| ks.types.clone()).unwrap_or_default()),
            _ => Err(SessionError::Rejected(format!(
                "unsupported query: {}",
                statement
            ))),
        }
    }
}
