//! Node DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::node::Node;

/// Summary information about a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub ip: String,
    pub node_type: String,
    pub node_function: String,
    pub active: bool,
    pub last_seen: DateTime<Utc>,
}

impl From<Node> for NodeSummary {
    fn from(node: Node) -> Self {
        NodeSummary {
            name: node.name,
            ip: node.ip,
            node_type: node.node_type,
            node_function: node.node_function,
            active: node.active,
            last_seen: node.last_seen,
        }
    }
}

/// Body of a node heartbeat
///
/// Empty fields leave the stored values unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeHeartbeat {
    pub node_type: String,
    pub node_function: String,
    pub slave_id: String,
}
