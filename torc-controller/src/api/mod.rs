//! API Module
//!
//! HTTP API layer for the controller.
//! Each submodule handles endpoints for a specific domain.

pub mod config;
pub mod error;
pub mod group;
pub mod health;
pub mod network;
pub mod node;
pub mod service;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness and configuration
        .route("/admin/ping", get(health::ping))
        .route("/config", get(config::get_config))
        // Node endpoints
        .route("/nodes", get(node::list_nodes))
        .route("/node/{name}", get(node::get_node))
        .route("/node/{name}/heartbeat", post(node::node_heartbeat))
        // Task endpoints
        .route("/services/running", get(service::list_running))
        .route("/services/metered", get(service::list_metered))
        .route(
            "/service",
            get(service::lookup_service).delete(service::kill_service),
        )
        .route("/service/announce", post(service::announce_service))
        // Service groups
        .route("/start/group", get(group::start_group))
        // Network
        .route("/routes", get(network::list_routes))
        .route("/calico/configure", get(network::configure_calico))
        .route("/calico/shutdown", get(network::shutdown_calico))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
