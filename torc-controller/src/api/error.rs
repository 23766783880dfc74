//! API Error Handling
//!
//! Unified error type and conversion of service errors for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::{group_service, node_service, task_service};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<task_service::TaskError> for ApiError {
    fn from(err: task_service::TaskError) -> Self {
        match err {
            task_service::TaskError::NotFound(name) => {
                ApiError::NotFound(format!("Task {} not found", name))
            }
            task_service::TaskError::ValidationError(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<group_service::GroupError> for ApiError {
    fn from(err: group_service::GroupError) -> Self {
        match err {
            group_service::GroupError::NotFound(name) => {
                ApiError::NotFound(format!("Service group {} not found", name))
            }
            group_service::GroupError::ValidationError(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<node_service::NodeError> for ApiError {
    fn from(err: node_service::NodeError) -> Self {
        match err {
            node_service::NodeError::NotFound(name) => {
                ApiError::NotFound(format!("Node {} not found", name))
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
