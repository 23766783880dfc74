//! Service Group API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use torc_core::dto::response::SimpleResponse;

use crate::api::error::ApiResult;
use crate::service::group_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    #[serde(default)]
    pub name: String,
}

/// GET /start/group?name=<group>
/// Request every service of a configured group
pub async fn start_group(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> ApiResult<Json<SimpleResponse>> {
    tracing::info!("Starting service group: {}", query.name);

    group_service::start_service_group(&state, &query.name).await?;

    Ok(Json(SimpleResponse::done()))
}
