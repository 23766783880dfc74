//! Switch network agent
//!
//! Each running task gets a `/32` host route through the external address of
//! the node it runs on. The controller keeps the routes it has programmed in
//! a table that is reset when it starts.

use std::collections::BTreeMap;

use tokio::sync::Mutex;
use torc_core::config::{NetworkAgentConfig, NetworkAgentKind};
use torc_core::dto::route::RouteEntry;

/// Plans the route for a task at `route_to` reachable through `route_via`
///
/// Returns `None` when there is no next hop, or when the destination is the
/// agent itself (its connection string starts with the destination address).
pub fn plan_add(connection: &str, route_to: &str, route_via: &str) -> Option<RouteEntry> {
    if route_via.is_empty() || connection.starts_with(route_to) {
        return None;
    }

    Some(RouteEntry {
        destination: host_prefix(route_to),
        via: route_via.to_string(),
    })
}

/// Plans the removal of the route to `route_to`
pub fn plan_delete(route_to: &str) -> Option<String> {
    if route_to.is_empty() {
        return None;
    }

    Some(host_prefix(route_to))
}

fn host_prefix(ip: &str) -> String {
    format!("{}/32", ip)
}

/// Route programming through the configured switch agent
#[derive(Debug)]
pub struct NetworkAgent {
    kind: NetworkAgentKind,
    connection: String,
    routes: Mutex<BTreeMap<String, String>>,
}

impl NetworkAgent {
    pub fn new(kind: NetworkAgentKind, connection: impl Into<String>) -> Self {
        Self {
            kind,
            connection: connection.into(),
            routes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Builds the agent from the `network-agent` section, if any
    pub fn from_config(config: Option<&NetworkAgentConfig>) -> Self {
        match config {
            Some(config) => Self::new(config.kind(), config.connection.clone()),
            None => Self::new(NetworkAgentKind::Undefined, ""),
        }
    }

    pub fn kind(&self) -> &NetworkAgentKind {
        &self.kind
    }

    /// Drops every programmed route
    pub async fn reset(&self) {
        if !self.check_supported("reset routes") {
            return;
        }

        self.routes.lock().await.clear();
        tracing::info!("Reset route table on {} agent", self.kind);
    }

    /// Programs the route to a task; returns true if a route was written
    pub async fn add_route(&self, route_to: &str, route_via: &str) -> bool {
        if !self.check_supported("add route") {
            return false;
        }

        let Some(entry) = plan_add(&self.connection, route_to, route_via) else {
            tracing::debug!("No route needed for {} via '{}'", route_to, route_via);
            return false;
        };

        tracing::info!("Adding route {} via {}", entry.destination, entry.via);
        self.routes.lock().await.insert(entry.destination, entry.via);
        true
    }

    /// Removes the route to a task; returns true if a route was removed
    pub async fn delete_route(&self, route_to: &str) -> bool {
        if !self.check_supported("delete route") {
            return false;
        }

        let Some(destination) = plan_delete(route_to) else {
            return false;
        };

        let removed = self.routes.lock().await.remove(&destination).is_some();
        if removed {
            tracing::info!("Deleted route {}", destination);
        }
        removed
    }

    /// Current routes ordered by destination
    pub async fn routes(&self) -> Vec<RouteEntry> {
        self.routes
            .lock()
            .await
            .iter()
            .map(|(destination, via)| RouteEntry {
                destination: destination.clone(),
                via: via.clone(),
            })
            .collect()
    }

    fn check_supported(&self, action: &str) -> bool {
        match &self.kind {
            NetworkAgentKind::Fboss | NetworkAgentKind::Snaproute => true,
            NetworkAgentKind::Undefined => {
                tracing::debug!("No network agent configured, skipping {}", action);
                false
            }
            NetworkAgentKind::Unknown(tag) => {
                tracing::warn!("Unknown network agent '{}', skipping {}", tag, action);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_add() {
        assert_eq!(
            plan_add("10.0.0.1:8080", "192.168.0.7", "172.16.0.2"),
            Some(RouteEntry {
                destination: "192.168.0.7/32".to_string(),
                via: "172.16.0.2".to_string(),
            })
        );
        assert_eq!(plan_add("10.0.0.1:8080", "192.168.0.7", ""), None);
        assert_eq!(plan_add("10.0.0.1:8080", "10.0.0.1", "172.16.0.2"), None);
        assert_eq!(plan_add("10.0.0.1:8080", "", "172.16.0.2"), None);
    }

    #[test]
    fn test_plan_delete() {
        assert_eq!(plan_delete("192.168.0.7").as_deref(), Some("192.168.0.7/32"));
        assert_eq!(plan_delete(""), None);
    }

    #[tokio::test]
    async fn test_supported_agent_tracks_routes() {
        let agent = NetworkAgent::new(NetworkAgentKind::Snaproute, "10.0.0.1:8080");

        assert!(agent.add_route("192.168.0.8", "172.16.0.3").await);
        assert!(agent.add_route("192.168.0.7", "172.16.0.2").await);
        assert!(!agent.add_route("192.168.0.9", "").await);

        let destinations: Vec<String> =
            agent.routes().await.into_iter().map(|r| r.destination).collect();
        assert_eq!(destinations, vec!["192.168.0.7/32", "192.168.0.8/32"]);

        assert!(agent.delete_route("192.168.0.7").await);
        assert!(!agent.delete_route("192.168.0.7").await);

        agent.reset().await;
        assert!(agent.routes().await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_agents_ignore_routes() {
        for kind in [
            NetworkAgentKind::Undefined,
            NetworkAgentKind::Unknown("cumulus".to_string()),
        ] {
            let agent = NetworkAgent::new(kind, "10.0.0.1:8080");
            assert!(!agent.add_route("192.168.0.7", "172.16.0.2").await);
            assert!(agent.routes().await.is_empty());
        }
    }

    #[test]
    fn test_from_missing_config_is_undefined() {
        let agent = NetworkAgent::from_config(None);
        assert_eq!(agent.kind(), &NetworkAgentKind::Undefined);
    }
}
