//! Configuration command handlers
//!
//! Offline validation and rendering of cluster configuration files, plus a
//! view of the configuration a running controller uses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use torc_client::ControllerClient;
use torc_core::config::{ClusterConfig, Severity, ValidationReport, Variables};

use crate::config::Config;

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Check a configuration file for errors
    Validate {
        /// Path to the configuration file
        file: PathBuf,

        #[command(flatten)]
        vars: VariableArgs,
    },
    /// Print a configuration file with every placeholder substituted
    Render {
        /// Path to the configuration file
        file: PathBuf,

        #[command(flatten)]
        vars: VariableArgs,
    },
    /// List the placeholders a configuration file references
    Placeholders {
        /// Path to the configuration file
        file: PathBuf,
    },
    /// Print the configuration the controller is running with
    Show,
}

/// Values for `$NAME` placeholders
#[derive(Args, Debug, Default)]
pub struct VariableArgs {
    /// Value for $MASTER_IP
    #[arg(long)]
    master_ip: Option<String>,

    /// Value for $MY_IP
    #[arg(long)]
    my_ip: Option<String>,

    /// Additional variables as NAME=value pairs
    #[arg(long = "var", value_parser = parse_key_val)]
    vars: Vec<(String, String)>,

    /// Fall back to the process environment for unset variables
    #[arg(long)]
    env: bool,
}

impl VariableArgs {
    fn is_empty(&self) -> bool {
        self.master_ip.is_none() && self.my_ip.is_none() && self.vars.is_empty() && !self.env
    }

    fn to_variables(&self) -> Variables {
        let mut variables = Variables::new();

        if let Some(ip) = &self.master_ip {
            variables = variables.with_master_ip(ip);
        }
        if let Some(ip) = &self.my_ip {
            variables = variables.with_my_ip(ip);
        }
        for (name, value) in &self.vars {
            variables = variables.with(name, value);
        }
        if self.env {
            variables = variables.with_process_env();
        }

        variables
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid NAME=value: no `=` found in `{}`", s))?;

    if key.is_empty() {
        anyhow::bail!("invalid NAME=value: empty name in `{}`", s);
    }

    Ok((key.to_string(), value.to_string()))
}

/// Handle configuration commands
pub async fn handle_config_command(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Validate { file, vars } => validate_file(&file, &vars),
        ConfigCommands::Render { file, vars } => render_file(&file, &vars),
        ConfigCommands::Placeholders { file } => list_placeholders(&file),
        ConfigCommands::Show => show_remote(config).await,
    }
}

fn load(file: &Path) -> Result<ClusterConfig> {
    ClusterConfig::from_file(file).with_context(|| format!("Failed to load {}", file.display()))
}

fn validate_file(file: &Path, vars: &VariableArgs) -> Result<()> {
    let mut cluster = load(file)?;

    // placeholders are tolerated by validation, so resolving is optional here
    if !vars.is_empty() {
        cluster = cluster.resolve(&vars.to_variables())?;
    }

    let report = cluster.validate();
    print_report(&report);

    if !report.is_valid() {
        anyhow::bail!(
            "{} has {} error(s)",
            file.display(),
            report.errors().count()
        );
    }

    println!("{} {} is valid", "✓".green(), file.display().to_string().bold());
    Ok(())
}

fn render_file(file: &Path, vars: &VariableArgs) -> Result<()> {
    let resolved = load(file)?.resolve(&vars.to_variables())?;
    print!("{}", resolved.to_yaml_string()?);
    Ok(())
}

fn list_placeholders(file: &Path) -> Result<()> {
    let names = load(file)?.placeholders()?;

    if names.is_empty() {
        println!("{}", "No placeholders referenced.".yellow());
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

async fn show_remote(config: &Config) -> Result<()> {
    let client = ControllerClient::new(&config.controller_url);
    let cluster = client.get_config().await?;

    print!("{}", cluster.to_yaml_string()?);
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for finding in &report.findings {
        let severity = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!(
            "{} [{}] {}: {}",
            severity,
            finding.code,
            finding.path.cyan(),
            finding.message
        );
    }
}
