//! Stale state expiry loop
//!
//! Drops running tasks of other controllers that stopped being announced and
//! marks nodes that stopped reporting as inactive.

use chrono::{DateTime, Utc};
use tokio::time::{self, Duration, Instant};
use tracing::info;

use super::period;
use crate::repository::{node_repository, task_repository};
use crate::state::AppState;

/// What one expiry pass did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpiryOutcome {
    pub tasks_removed: Vec<String>,
    pub nodes_deactivated: Vec<String>,
}

pub struct StateExpiry {
    state: AppState,
    interval: Duration,
    timeout: chrono::Duration,
}

impl StateExpiry {
    pub fn new(state: AppState) -> Self {
        let policy = state.config.stateclean;
        let timeout = i64::try_from(policy.timeout_in_seconds).unwrap_or(i64::MAX);

        Self {
            interval: period(policy.poll_interval_in_seconds),
            timeout: chrono::Duration::try_seconds(timeout).unwrap_or(chrono::Duration::MAX),
            state,
        }
    }

    /// Starts the loop in a background task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Runs the loop; the first pass happens one interval after start
    pub async fn run(&self) {
        info!(
            "Starting state expiry (interval: {:?}, timeout: {}s)",
            self.interval,
            self.timeout.num_seconds()
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        loop {
            ticker.tick().await;
            self.expire_once(Utc::now()).await;
        }
    }

    /// Performs a single expiry pass as of `now`
    pub async fn expire_once(&self, now: DateTime<Utc>) -> ExpiryOutcome {
        let removed = task_repository::remove_stale(
            &self.state.store,
            now,
            self.timeout,
            self.state.controller_name(),
        )
        .await;

        let mut tasks_removed = Vec::with_capacity(removed.len());
        for task in removed {
            self.state.network.delete_route(&task.ip).await;
            info!("Expired task {} of controller {}", task.name, task.controller);
            tasks_removed.push(task.name);
        }

        let nodes_deactivated =
            node_repository::mark_stale_inactive(&self.state.store, now, self.timeout).await;
        for name in &nodes_deactivated {
            info!("Node {} marked inactive", name);
        }

        ExpiryOutcome {
            tasks_removed,
            nodes_deactivated,
        }
    }
}
