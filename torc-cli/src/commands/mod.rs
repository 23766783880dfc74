//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod calico;
mod cluster;
mod group;
mod node;
mod service;

pub use calico::CalicoCommands;
pub use cluster::ConfigCommands;
pub use group::GroupCommands;
pub use node::NodeCommands;
pub use service::ServiceCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use torc_client::ControllerClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Cluster configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Node inventory
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },
    /// Running tasks
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },
    /// Service groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Calico network on the slave nodes
    Calico {
        #[command(subcommand)]
        command: CalicoCommands,
    },
    /// Show the routes programmed through the network agent
    Routes,
    /// Check that the controller is reachable
    Ping,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Config { command } => cluster::handle_config_command(command, config).await,
        Commands::Node { command } => node::handle_node_command(command, config).await,
        Commands::Service { command } => service::handle_service_command(command, config).await,
        Commands::Group { command } => group::handle_group_command(command, config).await,
        Commands::Calico { command } => calico::handle_calico_command(command, config).await,
        Commands::Routes => list_routes(config).await,
        Commands::Ping => ping(config).await,
    }
}

async fn ping(config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);
    let reply = client.ping().await?;

    println!(
        "{} {} replied {}",
        "✓".green(),
        client.base_url().bold(),
        reply.trim()
    );

    Ok(())
}

async fn list_routes(config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);
    let routes = client.list_routes().await?;

    if routes.is_empty() {
        println!("{}", "No routes programmed.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} route(s):", routes.len()).bold());
    println!();
    for route in routes {
        println!("  {} {} via {}", "▸".cyan(), route.destination.bold(), route.via);
    }

    Ok(())
}
