//! Keel CLI - operator interface
//!
//! - Discover column-store nodes through the service registry
//! - Resolve the contact points a session would be built from
//! - Plan the statements a schema manifest would issue against an empty cluster
//! - Show the effective configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use keel_config::{init_tracing, KeelConfig};

mod commands;
mod output;

use commands::{nodes, schema};
use output::OutputFormat;

/// Keel CLI application
#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Keel - declarative infrastructure reconciliation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "KEEL_CONFIG")]
    config: Option<String>,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List healthy column-store nodes
    Nodes(nodes::NodesArgs),

    /// Show the contact points a session would use
    ContactPoints,

    /// Schema manifests
    Schema {
        #[command(subcommand)]
        command: schema::SchemaCommands,
    },

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = KeelConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Nodes(args) => nodes::execute(args, &config, cli.output).await,
        Commands::ContactPoints => nodes::contact_points(&config, cli.output).await,
        Commands::Schema { command } => schema::execute(command, cli.output).await,
        Commands::Config => {
            println!("{:#?}", config);
            Ok(())
        }
    }
}
