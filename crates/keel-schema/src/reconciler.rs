//! Schema reconciler - create what is missing, nothing else

use crate::error::{Result, SchemaError};
use crate::session::{ClusterConfig, CqlSession, SessionConnector};
use crate::statements::{self, SchemaEntity};
use keel_types::{CTable, SchemaManifest, Udt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of one table or type reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Names created by this call, in issue order
    pub created: Vec<String>,

    /// Desired names that already existed
    pub present: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Outcome of applying a whole manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestReport {
    pub keyspace_created: bool,
    pub types: ReconcileReport,
    pub tables: ReconcileReport,
}

impl ManifestReport {
    pub fn is_noop(&self) -> bool {
        !self.keyspace_created && self.types.is_noop() && self.tables.is_noop()
    }
}

/// Reconciles keyspaces, user-defined types and tables
///
/// Every operation opens its own session from the current [`ClusterConfig`],
/// so the active keyspace is whatever the config holds at that moment.
/// Keyspace operations change it, which is why they take `&mut self`.
pub struct SchemaReconciler {
    config: ClusterConfig,
    connector: Arc<dyn SessionConnector>,
}

impl SchemaReconciler {
    pub fn new(config: ClusterConfig, connector: Arc<dyn SessionConnector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Keyspace sessions are currently opened in
    pub fn active_keyspace(&self) -> Option<&str> {
        self.config.keyspace.as_deref()
    }

    async fn open(&self) -> Result<Box<dyn CqlSession>> {
        self.connector
            .connect(&self.config)
            .await
            .map_err(|source| SchemaError::Connection {
                contact_points: self.config.endpoints(),
                source,
            })
    }

    /// Session with no keyspace selected, for cluster-wide catalog reads
    async fn open_unscoped(&self) -> Result<Box<dyn CqlSession>> {
        let config = ClusterConfig {
            keyspace: None,
            ..self.config.clone()
        };
        self.connector
            .connect(&config)
            .await
            .map_err(|source| SchemaError::Connection {
                contact_points: config.endpoints(),
                source,
            })
    }

    fn require_keyspace(&self) -> Result<&str> {
        self.active_keyspace().ok_or(SchemaError::NoKeyspaceSelected)
    }

    /// Keyspace and bare name `name` lives under, as the catalog stores them
    ///
    /// A `ks.name` qualifier wins over the active keyspace. Unquoted
    /// identifiers are case-insensitive and kept lowercase in the catalog.
    fn catalog_key(&self, name: &str) -> Result<(String, String)> {
        let (keyspace, bare) = match name.split_once('.') {
            Some(qualified) => qualified,
            None => (self.require_keyspace()?, name),
        };
        Ok((keyspace.to_ascii_lowercase(), bare.to_ascii_lowercase()))
    }

    async fn read_names(
        session: &dyn CqlSession,
        what: &str,
        query: &str,
        params: &[&str],
    ) -> Result<Vec<String>> {
        let names = session
            .query_column(query, params)
            .await
            .map_err(|source| SchemaError::Read {
                what: what.to_string(),
                source,
            })?;
        debug!(what, count = names.len(), "Read live names");
        Ok(names)
    }

    /// Table names in the active keyspace
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        let keyspace = self.require_keyspace()?.to_ascii_lowercase();
        let session = self.open().await?;
        Self::read_names(session.as_ref(), "tables", statements::SELECT_TABLES, &[keyspace.as_str()]).await
    }

    /// User-defined type names in the active keyspace
    pub async fn get_types(&self) -> Result<Vec<String>> {
        let keyspace = self.require_keyspace()?.to_ascii_lowercase();
        let session = self.open().await?;
        Self::read_names(session.as_ref(), "types", statements::SELECT_TYPES, &[keyspace.as_str()]).await
    }

    /// All keyspace names in the cluster
    pub async fn get_keyspaces(&self) -> Result<Vec<String>> {
        let session = self.open_unscoped().await?;
        Self::read_names(session.as_ref(), "keyspaces", statements::SELECT_KEYSPACES, &[]).await
    }

    /// Create a single table unconditionally
    #[instrument(skip(self, table), fields(table = %table.name))]
    pub async fn create_table(&self, table: &CTable) -> Result<()> {
        self.create_entity(table).await
    }

    /// Create a single user-defined type unconditionally
    #[instrument(skip(self, udt), fields(udt = %udt.name))]
    pub async fn create_udt(&self, udt: &Udt) -> Result<()> {
        self.create_entity(udt).await
    }

    async fn create_entity<E: SchemaEntity + Sync>(&self, entity: &E) -> Result<()> {
        statements::validate_entity_name(entity.name())?;
        let session = self.open().await?;
        info!("Creating {} {}", E::KIND, entity.name());
        session
            .execute(&entity.create_statement())
            .await
            .map_err(|source| SchemaError::Write {
                entity: format!("{} {}", E::KIND, entity.name()),
                source,
            })
    }

    /// Create every desired table missing from its keyspace
    #[instrument(skip(self, tables), fields(keyspace = ?self.config.keyspace, desired = tables.len()))]
    pub async fn create_required_tables(&self, tables: &[CTable]) -> Result<ReconcileReport> {
        self.reconcile(tables, "tables", statements::SELECT_TABLES).await
    }

    /// Create every desired user-defined type missing from its keyspace
    ///
    /// Types must be reconciled before the tables that reference them.
    #[instrument(skip(self, types), fields(keyspace = ?self.config.keyspace, desired = types.len()))]
    pub async fn create_required_types(&self, types: &[Udt]) -> Result<ReconcileReport> {
        self.reconcile(types, "types", statements::SELECT_TYPES).await
    }

    async fn reconcile<E: SchemaEntity + Sync>(
        &self,
        desired: &[E],
        what: &str,
        catalog_query: &str,
    ) -> Result<ReconcileReport> {
        let mut keys = Vec::with_capacity(desired.len());
        for entity in desired {
            statements::validate_entity_name(entity.name())?;
            keys.push(self.catalog_key(entity.name())?);
        }

        // Every catalog the desired names point at is read before any write
        let session = self.open().await?;
        let mut live: HashMap<&str, HashSet<String>> = HashMap::new();
        for (keyspace, _) in &keys {
            if live.contains_key(keyspace.as_str()) {
                continue;
            }
            let names = Self::read_names(session.as_ref(), what, catalog_query, &[keyspace.as_str()]).await?;
            live.insert(
                keyspace,
                names.iter().map(|n| n.to_ascii_lowercase()).collect(),
            );
        }

        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();
        let mut missing: Vec<&E> = Vec::new();
        for (entity, key) in desired.iter().zip(&keys) {
            if !seen.insert(key) {
                continue;
            }
            let (keyspace, bare) = key;
            if live
                .get(keyspace.as_str())
                .is_some_and(|names| names.contains(bare))
            {
                report.present.push(entity.name().to_string());
            } else {
                missing.push(entity);
            }
        }

        debug!(missing = missing.len(), present = report.present.len(), "Computed schema diff");

        for entity in missing {
            info!("Creating {} {}", E::KIND, entity.name());
            if let Err(source) = session.execute(&entity.create_statement()).await {
                let failed = format!("{} {}", E::KIND, entity.name());
                return Err(if report.created.is_empty() {
                    SchemaError::Write {
                        entity: failed,
                        source,
                    }
                } else {
                    SchemaError::PartialApply {
                        applied: report.created,
                        failed,
                        source,
                    }
                });
            }
            report.created.push(entity.name().to_string());
        }

        Ok(report)
    }

    /// Create `keyspace` if it does not exist, then make it the active keyspace
    ///
    /// Returns whether a create statement was issued.
    #[instrument(skip(self))]
    pub async fn create_keyspace(&mut self, keyspace: &str, replication_factor: &str) -> Result<bool> {
        statements::validate_keyspace_name(keyspace)?;
        let rf = statements::parse_replication_factor(keyspace, replication_factor)?;

        let existing = self.get_keyspaces().await?;
        let created = if existing.iter().any(|k| k.eq_ignore_ascii_case(keyspace)) {
            debug!("Keyspace already exists");
            false
        } else {
            info!("Creating keyspace: {}", keyspace);
            // A keyspace cannot be selected before it exists
            self.config.keyspace = None;
            let session = self.open().await?;
            session
                .execute(&statements::create_keyspace(keyspace, rf))
                .await
                .map_err(|source| SchemaError::Write {
                    entity: format!("keyspace {}", keyspace),
                    source,
                })?;
            true
        };

        self.config.keyspace = Some(keyspace.to_string());
        Ok(created)
    }

    /// Drop `keyspace` and everything in it
    ///
    /// No existence check is made; the statement is always issued. Intended
    /// for test teardown.
    #[instrument(skip(self))]
    pub async fn drop_keyspace(&mut self, keyspace: &str) -> Result<()> {
        statements::validate_keyspace_name(keyspace)?;
        self.config.keyspace = None;
        let session = self.open().await?;
        info!("Dropping keyspace: {}", keyspace);
        session
            .execute(&statements::drop_keyspace(keyspace))
            .await
            .map_err(|source| SchemaError::Write {
                entity: format!("keyspace {}", keyspace),
                source,
            })
    }

    /// Reconcile a manifest: keyspace, then types, then tables
    #[instrument(skip(self, manifest), fields(keyspace = %manifest.keyspace))]
    pub async fn apply_manifest(&mut self, manifest: &SchemaManifest) -> Result<ManifestReport> {
        let keyspace_created = self
            .create_keyspace(&manifest.keyspace, &manifest.replication_factor.to_string())
            .await?;
        let types = self.create_required_types(&manifest.types).await?;
        let tables = self.create_required_tables(&manifest.tables).await?;

        Ok(ManifestReport {
            keyspace_created,
            types,
            tables,
        })
    }
}
