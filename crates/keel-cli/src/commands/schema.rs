//! Schema manifest commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use keel_schema::{ClusterConfig, InMemoryCluster, SchemaReconciler};
use keel_types::SchemaManifest;

use crate::output::{render_lines, OutputFormat};

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Print the statements a manifest issues against an empty cluster
    Plan {
        /// Manifest file (YAML)
        manifest: PathBuf,
    },
}

pub async fn execute(command: SchemaCommands, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        SchemaCommands::Plan { manifest } => {
            let manifest = SchemaManifest::load(&manifest)
                .with_context(|| format!("reading {}", manifest.display()))?;
            let statements = plan(&manifest).await?;
            println!("{}", render_lines(&statements, format)?);
            Ok(())
        }
    }
}

/// Dry-run a manifest against an in-memory cluster
pub async fn plan(manifest: &SchemaManifest) -> anyhow::Result<Vec<String>> {
    let cluster = Arc::new(InMemoryCluster::new());
    let mut reconciler = SchemaReconciler::new(ClusterConfig::default(), cluster.clone());
    reconciler.apply_manifest(manifest).await?;
    Ok(cluster.statements())
}
