//! Node discovery command

use anyhow::Context;
use clap::Args;
use keel_config::KeelConfig;
use keel_discovery::{resolve_contact_points, NodeDiscovery};

use crate::output::{render_lines, OutputFormat};

#[derive(Args)]
pub struct NodesArgs {
    /// Registry service name, overriding configuration
    #[arg(long)]
    pub service: Option<String>,

    /// Print the configured contact points when no healthy node is found
    #[arg(long)]
    pub fallback: bool,
}

pub async fn execute(args: NodesArgs, config: &KeelConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut registry = config.registry.clone();
    if let Some(service) = args.service {
        registry.service_name = service;
    }

    let discovery = NodeDiscovery::from_config(&registry)
        .with_context(|| format!("connecting to registry at {}", registry.address))?;

    let nodes = if args.fallback {
        discovery
            .contact_points_or(&config.cassandra.contact_points)
            .await?
    } else {
        discovery.nodes().await?
    };

    tracing::debug!(service = %discovery.service_name(), count = nodes.len(), "Nodes discovered");
    println!("{}", render_lines(&nodes, format)?);
    Ok(())
}

/// Print the contact points a session would be built from
pub async fn contact_points(config: &KeelConfig, format: OutputFormat) -> anyhow::Result<()> {
    let points = resolve_contact_points(&config.cassandra, &config.registry)
        .await
        .with_context(|| format!("resolving contact points through {}", config.registry.address))?;
    println!("{}", render_lines(&points, format)?);
    Ok(())
}
