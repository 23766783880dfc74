//! Task Service
//!
//! Business logic for task tracking: announcements from node agents, system
//! service requests and kills.

use chrono::Utc;
use torc_core::domain::task::{Task, TaskState};

use crate::repository::{node_repository, task_repository};
use crate::state::AppState;

/// Service error type
#[derive(Debug)]
pub enum TaskError {
    NotFound(String),
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;

/// Record a task reported by a node agent
///
/// A task whose id is already known only gets its last update refreshed.
/// Otherwise the route to its address is programmed through the external
/// address of its node, any route to a previous address of a same-named task
/// is withdrawn, and the task is stored.
pub async fn announce_task(state: &AppState, mut task: Task) -> Result<()> {
    if task.name.trim().is_empty() {
        return Err(TaskError::ValidationError(
            "Task name cannot be empty".to_string(),
        ));
    }

    let now = Utc::now();

    if let Some(known) = task_repository::find_name_by_id_prefix(&state.store, &task.id).await {
        task_repository::touch(&state.store, &known, now).await;
        tracing::debug!("Refreshed task {} ({})", known, task.id);
        return Ok(());
    }

    if let Some(previous) = task_repository::find_by_name(&state.store, &task.name).await {
        if !previous.ip.is_empty() && previous.ip != task.ip {
            state.network.delete_route(&previous.ip).await;
        }
    }

    match node_repository::find_by_name(&state.store, &task.node_name).await {
        Some(node) => {
            state.network.add_route(&task.ip, &node.external_ip).await;
        }
        None => {
            tracing::debug!(
                "Task {} runs on unknown node '{}', no route added",
                task.name,
                task.node_name
            );
        }
    }

    tracing::info!("Task announced: {} at {} ({})", task.name, task.ip, task.state);

    task.last_update = now;
    task_repository::insert(&state.store, task).await;

    Ok(())
}

/// Record every configured system service as a requested task
///
/// Returns the number of tasks added; names already tracked are skipped.
pub async fn request_system_services(state: &AppState) -> usize {
    let mut requested = 0;

    for spec in &state.config.healthcheck.system_services {
        let task = Task::requested(spec, state.controller_name(), true);
        if task_repository::insert_if_absent(&state.store, task).await {
            requested += 1;
        }
    }

    tracing::info!("Requested {} system service(s)", requested);

    requested
}

/// Stop tracking a task and withdraw its route
pub async fn kill_task(state: &AppState, name: &str) -> Result<Task> {
    if name.trim().is_empty() {
        return Err(TaskError::ValidationError(
            "Task name cannot be empty".to_string(),
        ));
    }

    let task = task_repository::remove(&state.store, name)
        .await
        .ok_or_else(|| TaskError::NotFound(name.to_string()))?;

    state.network.delete_route(&task.ip).await;

    tracing::info!("Task killed: {}", name);

    Ok(task)
}

/// Running tasks that are not jobs
pub async fn list_running(state: &AppState) -> Vec<Task> {
    task_repository::list_with_state(&state.store, TaskState::Running)
        .await
        .into_iter()
        .filter(|task| !task.is_job)
        .collect()
}

/// Running tasks flagged as metered
pub async fn list_metered(state: &AppState) -> Vec<Task> {
    task_repository::list_with_state(&state.store, TaskState::Running)
        .await
        .into_iter()
        .filter(|task| task.is_metered)
        .collect()
}

/// Name of the task whose id starts with `prefix`, empty when none matches
pub async fn lookup_name_by_id(state: &AppState, prefix: &str) -> String {
    task_repository::find_name_by_id_prefix(&state.store, prefix)
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixture::test_state;

    fn announced(name: &str, id: &str, ip: &str) -> Task {
        Task {
            name: name.to_string(),
            id: id.to_string(),
            ip: ip.to_string(),
            node_name: "worker-1".to_string(),
            controller: "torc-test".to_string(),
            state: TaskState::Running,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_announce_new_task_adds_route() {
        let state = test_state().await;

        announce_task(&state, announced("web", "abc", "192.168.0.7"))
            .await
            .unwrap();

        let routes = state.network.routes().await;
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].destination, "192.168.0.7/32");
        assert_eq!(routes[0].via, "172.16.0.21");
        assert!(task_repository::find_by_name(&state.store, "web").await.is_some());
    }

    #[tokio::test]
    async fn test_announce_known_id_only_refreshes() {
        let state = test_state().await;
        announce_task(&state, announced("web", "abc-123", "192.168.0.7"))
            .await
            .unwrap();
        let before = task_repository::find_by_name(&state.store, "web")
            .await
            .unwrap()
            .last_update;

        let mut again = announced("web", "abc-123", "192.168.0.99");
        again.image = "changed".to_string();
        announce_task(&state, again).await.unwrap();

        let stored = task_repository::find_by_name(&state.store, "web").await.unwrap();
        assert_eq!(stored.ip, "192.168.0.7");
        assert!(stored.image.is_empty());
        assert!(stored.last_update >= before);
    }

    #[tokio::test]
    async fn test_announce_moved_task_replaces_route() {
        let state = test_state().await;
        announce_task(&state, announced("web", "first", "192.168.0.7"))
            .await
            .unwrap();

        announce_task(&state, announced("web", "second", "192.168.0.8"))
            .await
            .unwrap();

        let destinations: Vec<String> = state
            .network
            .routes()
            .await
            .into_iter()
            .map(|r| r.destination)
            .collect();
        assert_eq!(destinations, vec!["192.168.0.8/32"]);
    }

    #[tokio::test]
    async fn test_reannounce_same_address_keeps_route() {
        let state = test_state().await;
        announce_task(&state, announced("web", "first", "192.168.0.7"))
            .await
            .unwrap();

        announce_task(&state, announced("web", "second", "192.168.0.7"))
            .await
            .unwrap();

        assert_eq!(state.network.routes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_announce_rejects_empty_name() {
        let state = test_state().await;
        let result = announce_task(&state, announced(" ", "abc", "192.168.0.7")).await;
        assert!(matches!(result, Err(TaskError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_request_system_services_is_idempotent() {
        let state = test_state().await;

        assert_eq!(request_system_services(&state).await, 1);
        assert_eq!(request_system_services(&state).await, 0);

        let task = task_repository::find_by_name(&state.store, "consul-agent")
            .await
            .unwrap();
        assert_eq!(task.state, TaskState::Requested);
        assert!(task.is_system_service);
        assert_eq!(task.controller, "torc-test");
    }

    #[tokio::test]
    async fn test_kill_task_withdraws_route() {
        let state = test_state().await;
        announce_task(&state, announced("web", "abc", "192.168.0.7"))
            .await
            .unwrap();

        let killed = kill_task(&state, "web").await.unwrap();

        assert_eq!(killed.name, "web");
        assert!(state.network.routes().await.is_empty());
        assert!(matches!(
            kill_task(&state, "web").await,
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_filters() {
        let state = test_state().await;
        let mut metered = announced("web", "1", "192.168.0.7");
        metered.is_metered = true;
        let mut job = announced("backup", "2", "192.168.0.8");
        job.is_job = true;
        announce_task(&state, metered).await.unwrap();
        announce_task(&state, job).await.unwrap();

        let running: Vec<String> = list_running(&state).await.into_iter().map(|t| t.name).collect();
        let metered: Vec<String> = list_metered(&state).await.into_iter().map(|t| t.name).collect();

        assert_eq!(running, vec!["web"]);
        assert_eq!(metered, vec!["web"]);
        assert_eq!(lookup_name_by_id(&state, "2").await, "backup");
        assert_eq!(lookup_name_by_id(&state, "").await, "");
    }
}
