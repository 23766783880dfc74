//! Service command handlers
//!
//! Listing, lookup and kill of the tasks tracked by the controller.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use torc_client::ControllerClient;
use torc_core::domain::task::TaskState;
use torc_core::dto::task::TaskSummary;

use crate::config::Config;

/// Service subcommands
#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List running services
    List {
        /// Only show metered services
        #[arg(long)]
        metered: bool,
    },
    /// Find the service a task id (or id prefix) belongs to
    Lookup {
        /// Task id or prefix
        id: String,
    },
    /// Kill a service
    Kill {
        /// Service name
        name: String,
    },
}

/// Handle service commands
pub async fn handle_service_command(command: ServiceCommands, config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);

    match command {
        ServiceCommands::List { metered } => list_services(&client, metered).await,
        ServiceCommands::Lookup { id } => lookup_service(&client, &id).await,
        ServiceCommands::Kill { name } => {
            client.kill_service(&name).await?;
            println!("{} Service {} killed", "✓".green(), name.bold());
            Ok(())
        }
    }
}

async fn list_services(client: &ControllerClient, metered: bool) -> Result<()> {
    let tasks = if metered {
        client.list_metered().await?
    } else {
        client.list_running().await?
    };

    if tasks.is_empty() {
        println!("{}", "No running services.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} service(s):", tasks.len()).bold());
    println!();
    for task in tasks {
        print_task_summary(&TaskSummary::from(task));
    }

    Ok(())
}

async fn lookup_service(client: &ControllerClient, id: &str) -> Result<()> {
    match client.lookup_service(id).await? {
        Some(name) => println!("{}", name),
        None => println!("{}", format!("No service with id {}", id).yellow()),
    }
    Ok(())
}

fn print_task_summary(task: &TaskSummary) {
    println!("  {} Service {}", "▸".cyan(), task.name.bold());
    println!("    ID:      {}", task.id.dimmed());
    println!("    Image:   {}", task.image);
    println!("    Node:    {}", task.node_name);
    println!("    IP:      {}", task.ip);
    println!("    State:   {}", colorize_state(task.state));
    if task.is_metered {
        println!("    Metered: {}", "yes".cyan());
    }
    println!(
        "    Updated: {}",
        task.last_update
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn colorize_state(state: TaskState) -> ColoredString {
    let label = state.to_string();
    match state {
        TaskState::Running => label.green(),
        TaskState::Requested | TaskState::Accepted => label.yellow(),
        TaskState::Restart => label.magenta(),
        TaskState::NotRunning => label.red(),
    }
}
