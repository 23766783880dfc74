//! Node Service
//!
//! Business logic for the node inventory.

use chrono::Utc;
use torc_core::domain::node::Node;
use torc_core::dto::node::NodeHeartbeat;

use crate::repository::node_repository;
use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum NodeError {
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;

/// List all nodes
pub async fn list_nodes(state: &AppState) -> Vec<Node> {
    node_repository::list_all(&state.store).await
}

/// Get a node by name
pub async fn get_node(state: &AppState, name: &str) -> Result<Node> {
    node_repository::find_by_name(&state.store, name)
        .await
        .ok_or_else(|| NodeError::NotFound(name.to_string()))
}

/// Record a heartbeat from a node's agent
///
/// Marks the node active and stores any role information it reported.
pub async fn heartbeat(state: &AppState, name: &str, report: NodeHeartbeat) -> Result<()> {
    let touched = node_repository::touch(&state.store, name, Utc::now()).await;
    if !touched {
        return Err(NodeError::NotFound(name.to_string()));
    }

    node_repository::update(
        &state.store,
        name,
        &report.node_type,
        &report.node_function,
        &report.slave_id,
    )
    .await;

    tracing::debug!("Heartbeat from node: {}", name);

    Ok(())
}
