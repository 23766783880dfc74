//! Shared controller state handed to handlers and workers

use std::sync::Arc;

use torc_core::config::ClusterConfig;

use crate::collaborator::{CalicoClient, NetworkAgent, ServiceRegistry};
use crate::store::{Store, create_store};

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,

    /// Resolved cluster configuration
    pub config: Arc<ClusterConfig>,

    pub registry: ServiceRegistry,
    pub network: Arc<NetworkAgent>,

    /// Node agents that set up the calico network
    pub calico: CalicoClient,
}

impl AppState {
    /// Builds the state for a resolved configuration with an empty store
    pub fn new(config: ClusterConfig, registry: ServiceRegistry, calico: CalicoClient) -> Self {
        let network = NetworkAgent::from_config(config.network_agent.as_ref());

        Self {
            store: create_store(),
            config: Arc::new(config),
            registry,
            network: Arc::new(network),
            calico,
        }
    }

    /// Name this controller stamps on the tasks it requests
    pub fn controller_name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::store::seed_nodes;

    const CLUSTER: &str = include_str!("../tests/fixtures/cluster.yml");

    /// State for the fixture cluster with its nodes seeded and every outbound client disabled
    pub(crate) async fn test_state() -> AppState {
        let config = ClusterConfig::from_yaml_str(CLUSTER).unwrap();
        let state = AppState::new(config, ServiceRegistry::disabled(), CalicoClient::disabled());
        seed_nodes(&state.store, &state.config).await;
        state
    }
}
