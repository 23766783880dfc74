//! Calico network command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use torc_client::ControllerClient;

use crate::config::Config;

/// Calico subcommands
#[derive(Subcommand)]
pub enum CalicoCommands {
    /// Start calico on every slave and create the address pool and network
    Configure,
    /// Stop calico and remove the address pool and network
    Shutdown,
}

pub async fn handle_calico_command(command: CalicoCommands, config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);

    match command {
        CalicoCommands::Configure => {
            client.configure_calico().await?;
            println!("{} Calico network configured", "✓".green());
        }
        CalicoCommands::Shutdown => {
            client.shutdown_calico().await?;
            println!("{} Calico network shut down", "✓".green());
        }
    }

    Ok(())
}
