//! Service API Handlers
//!
//! HTTP endpoints for running tasks: announcements from node agents, lookups
//! and kills.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use torc_core::domain::task::Task;
use torc_core::dto::response::SimpleResponse;

use crate::api::error::ApiResult;
use crate::service::task_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct KillQuery {
    #[serde(default)]
    pub name: String,
}

// =============================================================================
// Queries
// =============================================================================

/// GET /services/running
/// Running tasks that are not jobs
pub async fn list_running(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(task_service::list_running(&state).await)
}

/// GET /services/metered
/// Running tasks flagged as metered
pub async fn list_metered(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(task_service::list_metered(&state).await)
}

/// GET /service?id=<prefix>
/// Resolve a task id (or id prefix) to the task name
///
/// Browser dashboards call this cross-origin, so the response allows any origin.
pub async fn lookup_service(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    let name = task_service::lookup_name_by_id(&state, &query.id).await;

    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(SimpleResponse::new(name)),
    )
}

// =============================================================================
// Lifecycle
// =============================================================================

/// POST /service/announce
/// Record a task reported by a node agent
pub async fn announce_service(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> ApiResult<Json<SimpleResponse>> {
    tracing::debug!("Announcement for task: {}", task.name);

    task_service::announce_task(&state, task).await?;

    Ok(Json(SimpleResponse::done()))
}

/// DELETE /service?name=<task>
/// Kill a task
pub async fn kill_service(
    State(state): State<AppState>,
    Query(query): Query<KillQuery>,
) -> ApiResult<Json<SimpleResponse>> {
    tracing::info!("Killing task: {}", query.name);

    task_service::kill_task(&state, &query.name).await?;

    Ok(Json(SimpleResponse::done()))
}
