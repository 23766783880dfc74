//! Node domain model
//!
//! Represents a machine known to the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::NodeConfig;

/// Node function assigned before any agent has reported in
pub const UNASSIGNED_FUNCTION: &str = "none";

/// A machine in the cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,

    /// Cluster-internal address
    pub ip: String,

    /// Address routes to tasks on this node go through
    pub external_ip: String,

    /// Out-of-band management address
    pub management_ip: String,

    /// Switch port the node is attached to
    pub port_id: u32,

    /// Node role, e.g. `master` or `slave`
    pub node_type: String,

    pub node_function: String,

    /// Whether the node has reported in within the cleanup timeout
    pub active: bool,

    /// Identifier the node's agent registered with
    pub slave_id: String,

    pub last_seen: DateTime<Utc>,
}

impl Node {
    /// Builds an inactive node from a (resolved) config entry
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            name: config.name.clone(),
            ip: config.ip.clone(),
            external_ip: config.external_ip.clone().unwrap_or_default(),
            management_ip: config.management_ip.clone().unwrap_or_default(),
            port_id: config.port.unwrap_or_default(),
            node_type: config.node_type.clone(),
            node_function: UNASSIGNED_FUNCTION.to_string(),
            active: false,
            slave_id: String::new(),
            last_seen: Utc::now(),
        }
    }

    /// Whether the node has not been seen for longer than `timeout`
    pub fn is_stale(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        self.last_seen
            .checked_add_signed(timeout)
            .is_some_and(|deadline| deadline < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let config = NodeConfig {
            name: "master".to_string(),
            ip: "10.0.0.1".to_string(),
            node_type: "master".to_string(),
            external_ip: None,
            management_ip: Some("10.1.0.1".to_string()),
            port: None,
        };

        let node = Node::from_config(&config);

        assert_eq!(node.name, "master");
        assert_eq!(node.external_ip, "");
        assert_eq!(node.management_ip, "10.1.0.1");
        assert_eq!(node.port_id, 0);
        assert_eq!(node.node_function, UNASSIGNED_FUNCTION);
        assert!(!node.active);
    }

    #[test]
    fn test_is_stale() {
        let config = NodeConfig {
            name: "n".to_string(),
            ip: "10.0.0.1".to_string(),
            node_type: "slave".to_string(),
            external_ip: None,
            management_ip: None,
            port: None,
        };
        let mut node = Node::from_config(&config);
        let now = Utc::now();
        node.last_seen = now - chrono::Duration::seconds(60);

        assert!(node.is_stale(now, chrono::Duration::seconds(30)));
        assert!(!node.is_stale(now, chrono::Duration::seconds(90)));
    }
}
