//! Service group command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use torc_client::ControllerClient;

use crate::config::Config;

/// Service group subcommands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Start every service of a configured group
    Start {
        /// Group name
        name: String,
    },
}

/// Handle service group commands
pub async fn handle_group_command(command: GroupCommands, config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);

    match command {
        GroupCommands::Start { name } => {
            client.start_group(&name).await?;
            println!("{} Group {} started", "✓".green(), name.bold());
            Ok(())
        }
    }
}
