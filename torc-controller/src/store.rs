//! In-memory controller state
//!
//! Nodes and tasks live in a single table set behind an async lock. The
//! store is seeded with the node inventory of the resolved configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use torc_core::config::ClusterConfig;
use torc_core::domain::node::Node;
use torc_core::domain::task::Task;

/// Node and task tables keyed by name
#[derive(Debug, Default)]
pub struct Tables {
    pub nodes: BTreeMap<String, Node>,
    pub tasks: BTreeMap<String, Task>,
}

/// Shared handle to the controller state
pub type Store = Arc<RwLock<Tables>>;

pub fn create_store() -> Store {
    Arc::new(RwLock::new(Tables::default()))
}

/// Loads the node inventory from `config`
///
/// Returns the number of nodes added. Nodes already present are left as-is.
pub async fn seed_nodes(store: &Store, config: &ClusterConfig) -> usize {
    let mut tables = store.write().await;
    let mut added = 0;

    for node_config in &config.nodes {
        if tables.nodes.contains_key(&node_config.name) {
            continue;
        }
        tables
            .nodes
            .insert(node_config.name.clone(), Node::from_config(node_config));
        added += 1;
    }

    tracing::info!("Seeded {} node(s) from configuration", added);

    added
}
