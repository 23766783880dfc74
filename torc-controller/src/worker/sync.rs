//! State synchronisation loop
//!
//! Registers every running task with the service registry and re-announces
//! the tasks owned by this controller so they never expire locally.

use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};
use torc_core::domain::task::TaskState;

use super::period;
use crate::repository::task_repository;
use crate::service::task_service;
use crate::state::AppState;

/// What one synchronisation pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub registered: usize,
    pub reannounced: usize,
}

pub struct StateSync {
    state: AppState,
    interval: Duration,
}

impl StateSync {
    pub fn new(state: AppState) -> Self {
        let interval = period(state.config.statesync.poll_interval_in_seconds);
        Self { state, interval }
    }

    /// Starts the loop in a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Runs the loop; the first pass happens one interval after start
    pub async fn run(&self) {
        info!("Starting state sync (interval: {:?})", self.interval);

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        loop {
            ticker.tick().await;

            let outcome = self.sync_once().await;
            debug!(
                "State sync: {} registered, {} re-announced",
                outcome.registered, outcome.reannounced
            );
        }
    }

    /// Performs a single synchronisation pass
    pub async fn sync_once(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let running = task_repository::list_with_state(&self.state.store, TaskState::Running).await;

        for task in running {
            if self.state.registry.register(&task.name, &task.ip).await {
                outcome.registered += 1;
            }

            if task.controller != self.state.controller_name() {
                continue;
            }

            let name = task.name.clone();
            match task_service::announce_task(&self.state, task).await {
                Ok(()) => outcome.reannounced += 1,
                Err(e) => warn!("Failed to re-announce {}: {:?}", name, e),
            }
        }

        outcome
    }
}
