//! Node command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use torc_client::ControllerClient;
use torc_core::domain::node::Node;
use torc_core::dto::node::NodeSummary;

use crate::config::Config;

/// Node subcommands
#[derive(Subcommand)]
pub enum NodeCommands {
    /// List all nodes
    List,
    /// Get node details
    Get {
        /// Node name
        name: String,
    },
}

/// Handle node commands
pub async fn handle_node_command(command: NodeCommands, config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);

    match command {
        NodeCommands::List => list_nodes(&client).await,
        NodeCommands::Get { name } => get_node(&client, &name).await,
    }
}

async fn list_nodes(client: &ControllerClient) -> Result<()> {
    let nodes = client.list_nodes().await?;

    if nodes.is_empty() {
        println!("{}", "No nodes known.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} node(s):", nodes.len()).bold());
    println!();
    for node in nodes {
        print_node_summary(&NodeSummary::from(node));
    }

    Ok(())
}

async fn get_node(client: &ControllerClient, name: &str) -> Result<()> {
    let node = client.get_node(name).await?;
    print_node_details(&node);
    Ok(())
}

fn print_node_summary(node: &NodeSummary) {
    println!("  {} Node {}", "▸".cyan(), node.name.bold());
    println!("    IP:        {}", node.ip);
    println!("    Type:      {}", node.node_type);
    println!("    Function:  {}", node.node_function);
    println!("    Status:    {}", colorize_active(node.active));
    println!(
        "    Last Seen: {}",
        node.last_seen
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_node_details(node: &Node) {
    println!("{}", format!("Node {}", node.name).bold());
    println!("  IP:            {}", node.ip);
    println!("  External IP:   {}", display_or_dash(&node.external_ip));
    println!("  Management IP: {}", display_or_dash(&node.management_ip));
    println!("  Switch Port:   {}", node.port_id);
    println!("  Type:          {}", node.node_type);
    println!("  Function:      {}", node.node_function);
    println!("  Agent ID:      {}", display_or_dash(&node.slave_id));
    println!("  Status:        {}", colorize_active(node.active));
    println!(
        "  Last Seen:     {}",
        node.last_seen.format("%Y-%m-%d %H:%M:%S")
    );
}

fn colorize_active(active: bool) -> ColoredString {
    if active {
        "active".green()
    } else {
        "inactive".red()
    }
}

fn display_or_dash(value: &str) -> ColoredString {
    if value.is_empty() {
        "-".dimmed()
    } else {
        value.normal()
    }
}
