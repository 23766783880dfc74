//! Configuration API Handler

use axum::{Json, extract::State};
use torc_core::config::ClusterConfig;

use crate::state::AppState;

/// GET /config
/// The resolved cluster configuration the controller runs with
pub async fn get_config(State(state): State<AppState>) -> Json<ClusterConfig> {
    Json(state.config.as_ref().clone())
}
