//! Task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{ServiceSpec, Sla, VolumeMount};

/// A service instance tracked by the controller
///
/// Structure shared between the controller (records) and node agents
/// (announce running instances).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub name: String,

    /// Name of the controller that requested the task
    pub controller: String,

    /// Identifier assigned by the executing agent
    pub id: String,

    pub image: String,
    pub node_name: String,
    pub node_type: String,
    pub node_function: String,
    pub dependent_service: String,
    pub arguments: String,
    pub parameters: String,
    pub memory: f64,
    pub cpu: f64,
    pub privileged: bool,
    pub sla: Option<Sla>,
    pub is_metered: bool,
    pub is_system_service: bool,
    pub is_job: bool,
    pub volumes: Vec<VolumeMount>,
    pub network_type: String,

    /// Address of the running instance
    pub ip: String,

    pub slave_id: String,
    pub state: TaskState,

    /// Accepts epoch seconds as sent by node agents, or RFC 3339
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_update: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Seconds(i64),
    Rfc3339(DateTime<Utc>),
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Timestamp::deserialize(deserializer)? {
        Timestamp::Seconds(secs) => DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            serde::de::Error::custom(format!("timestamp {} is out of range", secs))
        }),
        Timestamp::Rfc3339(at) => Ok(at),
    }
}

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    NotRunning,
    Restart,
    Requested,
    Accepted,
    Running,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::NotRunning => write!(f, "NotRunning"),
            TaskState::Restart => write!(f, "Restart"),
            TaskState::Requested => write!(f, "Requested"),
            TaskState::Accepted => write!(f, "Accepted"),
            TaskState::Running => write!(f, "Running"),
        }
    }
}

impl Task {
    /// Builds a `Requested` task from a service descriptor
    pub fn requested(spec: &ServiceSpec, controller: &str, is_system_service: bool) -> Self {
        Self {
            name: spec.name.clone(),
            controller: controller.to_string(),
            id: String::new(),
            image: spec.image_name.clone(),
            node_name: spec.node_name.clone().unwrap_or_default(),
            node_type: spec.node_type.clone().unwrap_or_default(),
            node_function: spec.node_function.clone(),
            dependent_service: spec.dependent_service.clone().unwrap_or_default(),
            arguments: spec.arguments.clone(),
            parameters: spec.parameters.clone().unwrap_or_default(),
            memory: spec.memory.unwrap_or_default(),
            cpu: spec.cpu.unwrap_or_default(),
            privileged: spec.privileged,
            sla: spec.sla,
            is_metered: spec.is_metered,
            is_system_service,
            is_job: spec.is_job,
            volumes: spec.volumes.clone(),
            network_type: spec.network_type.clone(),
            ip: String::new(),
            slave_id: String::new(),
            state: TaskState::Requested,
            last_update: Utc::now(),
        }
    }

    /// Whether the task has not been refreshed for longer than `timeout`
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        self.last_update
            .checked_add_signed(timeout)
            .is_some_and(|deadline| deadline < now)
    }
}
