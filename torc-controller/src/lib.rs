//! Torc controller
//!
//! Tracks the nodes and tasks of a cluster described by a YAML configuration,
//! keeps the service registry and the switch routes in step with the running
//! tasks, and serves the controller HTTP API.

pub mod api;
pub mod collaborator;
pub mod config;
pub mod repository;
pub mod service;
pub mod state;
pub mod store;
pub mod worker;

use anyhow::Context;
use torc_core::config::{ClusterConfig, Variables};

use crate::collaborator::{CalicoClient, ServiceRegistry};
use crate::worker::MAX_INTERVAL_SECS;
use crate::config::ControllerSettings;
use crate::service::task_service;
use crate::state::AppState;

/// Loads, resolves and validates the cluster configuration named by `settings`
///
/// Warnings are logged; any validation error aborts.
pub fn load_cluster_config(settings: &ControllerSettings) -> anyhow::Result<ClusterConfig> {
    let raw = ClusterConfig::from_file(&settings.config_file).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            settings.config_file.display()
        )
    })?;

    let variables = Variables::new()
        .with_master_ip(&settings.master_ip)
        .with_my_ip(&settings.my_ip)
        .with_process_env();

    let config = raw
        .resolve(&variables)
        .context("Failed to resolve configuration placeholders")?;

    let report = config.validate();
    for warning in report.warnings() {
        tracing::warn!("{}", warning);
    }

    if !report.is_valid() {
        for error in report.errors() {
            tracing::error!("{}", error);
        }
        anyhow::bail!(
            "Configuration has {} error(s)",
            report.errors().count()
        );
    }

    check_worker_intervals(&config)?;

    Ok(config)
}

/// Rejects intervals the controller's loops cannot run with
fn check_worker_intervals(config: &ClusterConfig) -> anyhow::Result<()> {
    let intervals = [
        ("statesync", config.statesync.poll_interval_in_seconds),
        ("stateclean", config.stateclean.poll_interval_in_seconds),
    ];

    for (section, seconds) in intervals {
        if seconds == 0 {
            anyhow::bail!("{}.poll_interval_in_seconds must be greater than 0", section);
        }
        if seconds > MAX_INTERVAL_SECS {
            anyhow::bail!(
                "{}.poll_interval_in_seconds must be at most {}, got {}",
                section,
                MAX_INTERVAL_SECS,
                seconds
            );
        }
    }

    Ok(())
}

/// Builds the controller state and brings it to its startup condition
///
/// Seeds the node inventory, resets the route table and requests the system
/// services.
pub async fn bootstrap(settings: &ControllerSettings, config: ClusterConfig) -> anyhow::Result<AppState> {
    let registry = if settings.registry_enabled {
        ServiceRegistry::new(&settings.master_ip).context("Failed to build registry client")?
    } else {
        tracing::info!("Service registry disabled");
        ServiceRegistry::disabled()
    };

    let calico = if settings.node_agents_enabled {
        CalicoClient::new().context("Failed to build node agent client")?
    } else {
        tracing::info!("Node agents disabled");
        CalicoClient::disabled()
    };

    let state = AppState::new(config, registry, calico);

    store::seed_nodes(&state.store, &state.config).await;
    state.network.reset().await;
    task_service::request_system_services(&state).await;

    Ok(state)
}
