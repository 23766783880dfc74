//! Task DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::task::{Task, TaskState};

/// Summary information about a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    pub name: String,
    pub id: String,
    pub image: String,
    pub node_name: String,
    pub ip: String,
    pub state: TaskState,
    pub is_metered: bool,
    pub last_update: DateTime<Utc>,
}

impl From<Task> for TaskSummary {
    fn from(task: Task) -> Self {
        TaskSummary {
            name: task.name,
            id: task.id,
            image: task.image,
            node_name: task.node_name,
            ip: task.ip,
            state: task.state,
            is_metered: task.is_metered,
            last_update: task.last_update,
        }
    }
}
