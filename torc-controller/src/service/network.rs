//! Network Service
//!
//! Calico network setup across the node inventory.

use crate::collaborator::calico::{self, NodeCommand};
use crate::repository::node_repository;
use crate::state::AppState;

/// Commands planned for a network action and how many the agents accepted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub planned: usize,
    pub accepted: usize,
}

/// Bring the calico network up on the known nodes
pub async fn configure_network(state: &AppState) -> CommandOutcome {
    let nodes = node_repository::list_all(&state.store).await;
    run(state, "configure", calico::plan_configure(&nodes)).await
}

/// Tear the calico network down on the known nodes
pub async fn shutdown_network(state: &AppState) -> CommandOutcome {
    let nodes = node_repository::list_all(&state.store).await;
    run(state, "shutdown", calico::plan_shutdown(&nodes)).await
}

async fn run(state: &AppState, action: &str, commands: Vec<NodeCommand>) -> CommandOutcome {
    let accepted = state.calico.apply(&commands).await;
    let outcome = CommandOutcome {
        planned: commands.len(),
        accepted,
    };

    if state.calico.is_enabled() && accepted < outcome.planned {
        tracing::warn!(
            "Calico {}: {} of {} command(s) accepted",
            action,
            accepted,
            outcome.planned
        );
    } else {
        tracing::info!("Calico {}: {} command(s) planned", action, outcome.planned);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixture::test_state;

    #[tokio::test]
    async fn test_configure_plans_for_fixture_slaves() {
        let state = test_state().await;

        let outcome = configure_network(&state).await;

        // worker-1 is the only slave: node start, pool, network
        assert_eq!(outcome, CommandOutcome { planned: 3, accepted: 0 });
    }

    #[tokio::test]
    async fn test_shutdown_plans_for_fixture_slaves() {
        let state = test_state().await;

        let outcome = shutdown_network(&state).await;

        assert_eq!(outcome, CommandOutcome { planned: 4, accepted: 0 });
    }
}
