//! Health Check API Handler

use axum::{http::StatusCode, response::IntoResponse};

/// GET /admin/ping
/// Liveness probe
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}
