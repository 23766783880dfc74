//! Service Group Service
//!
//! Starts the named groups of services declared under `api.service-groups`.

use torc_core::domain::task::Task;

use crate::repository::task_repository;
use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum GroupError {
    NotFound(String),
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, GroupError>;

/// Request every service of the named group
///
/// Each service becomes a `Requested` task owned by this controller. Services
/// already tracked under the same name are left alone. Returns the number of
/// tasks requested.
pub async fn start_service_group(state: &AppState, name: &str) -> Result<usize> {
    if name.trim().is_empty() {
        return Err(GroupError::ValidationError(
            "Group name cannot be empty".to_string(),
        ));
    }

    let group = state
        .config
        .service_group(name)
        .ok_or_else(|| GroupError::NotFound(name.to_string()))?;

    let mut requested = 0;
    for spec in &group.services {
        let task = Task::requested(spec, state.controller_name(), false);
        if task_repository::insert_if_absent(&state.store, task).await {
            requested += 1;
        } else {
            tracing::debug!("Service {} is already tracked", spec.name);
        }
    }

    tracing::info!(
        "Started group {}: {} of {} service(s) requested",
        name,
        requested,
        group.services.len()
    );

    Ok(requested)
}
