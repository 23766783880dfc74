//! Network API Handlers

use axum::{Json, extract::State};
use torc_core::dto::response::SimpleResponse;
use torc_core::dto::route::RouteEntry;

use crate::service::network_service;
use crate::state::AppState;

/// GET /routes
/// Host routes currently programmed through the network agent
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteEntry>> {
    Json(state.network.routes().await)
}

/// GET /calico/configure
/// Start calico on every slave node and create the pool and docker network
pub async fn configure_calico(State(state): State<AppState>) -> Json<SimpleResponse> {
    network_service::configure_network(&state).await;
    Json(SimpleResponse::done())
}

/// GET /calico/shutdown
pub async fn shutdown_calico(State(state): State<AppState>) -> Json<SimpleResponse> {
    network_service::shutdown_network(&state).await;
    Json(SimpleResponse::done())
}
