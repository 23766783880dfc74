//! Task Repository
//!
//! Handles all store operations related to tasks.

use chrono::{DateTime, Utc};
use torc_core::domain::task::{Task, TaskState};

use crate::store::Store;

/// Insert or replace a task, returning the previous entry with that name
pub async fn insert(store: &Store, task: Task) -> Option<Task> {
    let mut tables = store.write().await;
    tables.tasks.insert(task.name.clone(), task)
}

/// Insert a task unless one with the same name is already tracked
pub async fn insert_if_absent(store: &Store, task: Task) -> bool {
    let mut tables = store.write().await;
    if tables.tasks.contains_key(&task.name) {
        return false;
    }
    tables.tasks.insert(task.name.clone(), task);
    true
}

/// Find a task by name
pub async fn find_by_name(store: &Store, name: &str) -> Option<Task> {
    store.read().await.tasks.get(name).cloned()
}

/// Find the name of the first task whose id starts with `prefix`
///
/// An empty prefix never matches.
pub async fn find_name_by_id_prefix(store: &Store, prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }

    store
        .read()
        .await
        .tasks
        .values()
        .find(|task| !task.id.is_empty() && task.id.starts_with(prefix))
        .map(|task| task.name.clone())
}

/// List tasks in the given state, ordered by name
pub async fn list_with_state(store: &Store, state: TaskState) -> Vec<Task> {
    store
        .read()
        .await
        .tasks
        .values()
        .filter(|task| task.state == state)
        .cloned()
        .collect()
}

/// Refresh the last update time of a task
pub async fn touch(store: &Store, name: &str, now: DateTime<Utc>) -> bool {
    let mut tables = store.write().await;
    match tables.tasks.get_mut(name) {
        Some(task) => {
            task.last_update = now;
            true
        }
        None => false,
    }
}

/// Delete a task by name
pub async fn remove(store: &Store, name: &str) -> Option<Task> {
    store.write().await.tasks.remove(name)
}

/// Remove running tasks of other controllers that went quiet for longer than `timeout`
/// Returns the removed tasks
pub async fn remove_stale(
    store: &Store,
    now: DateTime<Utc>,
    timeout: chrono::Duration,
    owner: &str,
) -> Vec<Task> {
    let mut tables = store.write().await;

    let stale: Vec<String> = tables
        .tasks
        .values()
        .filter(|task| {
            task.state == TaskState::Running
                && task.controller != owner
                && task.is_stale(now, timeout)
        })
        .map(|task| task.name.clone())
        .collect();

    stale
        .iter()
        .filter_map(|name| tables.tasks.remove(name))
        .collect()
}
