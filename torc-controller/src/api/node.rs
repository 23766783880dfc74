//! Node API Handlers
//!
//! HTTP endpoints for the node inventory.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use torc_core::domain::node::Node;
use torc_core::dto::node::NodeHeartbeat;

use crate::api::error::ApiResult;
use crate::service::node_service;
use crate::state::AppState;

/// GET /nodes
/// List all nodes
pub async fn list_nodes(State(state): State<AppState>) -> Json<Vec<Node>> {
    tracing::debug!("Listing all nodes");

    Json(node_service::list_nodes(&state).await)
}

/// GET /node/{name}
/// Get details for a specific node
pub async fn get_node(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Node>> {
    tracing::debug!("Getting node: {}", name);

    let node = node_service::get_node(&state, &name).await?;

    Ok(Json(node))
}

/// POST /node/{name}/heartbeat
/// Mark a node as alive and record its reported role
pub async fn node_heartbeat(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(report): Json<NodeHeartbeat>,
) -> ApiResult<StatusCode> {
    node_service::heartbeat(&state, &name, report).await?;

    Ok(StatusCode::NO_CONTENT)
}
