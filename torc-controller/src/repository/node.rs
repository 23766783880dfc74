//! Node Repository
//!
//! Handles all store operations related to nodes.

use chrono::{DateTime, Utc};
use torc_core::domain::node::Node;

use crate::store::Store;

/// Insert or replace a node
///
/// Returns true if the node was not known before.
pub async fn add(store: &Store, node: Node) -> bool {
    let mut tables = store.write().await;
    tables.nodes.insert(node.name.clone(), node).is_none()
}

/// Find a node by name
pub async fn find_by_name(store: &Store, name: &str) -> Option<Node> {
    store.read().await.nodes.get(name).cloned()
}

/// List all nodes, ordered by name
pub async fn list_all(store: &Store) -> Vec<Node> {
    store.read().await.nodes.values().cloned().collect()
}

/// Update the role information reported by a node's agent
///
/// Empty values leave the stored field unchanged.
pub async fn update(
    store: &Store,
    name: &str,
    node_type: &str,
    node_function: &str,
    slave_id: &str,
) -> bool {
    let mut tables = store.write().await;
    let Some(node) = tables.nodes.get_mut(name) else {
        return false;
    };

    if !node_type.is_empty() {
        node.node_type = node_type.to_string();
    }
    if !node_function.is_empty() {
        node.node_function = node_function.to_string();
    }
    if !slave_id.is_empty() {
        node.slave_id = slave_id.to_string();
    }

    true
}

/// Mark a node as seen at `now`
pub async fn touch(store: &Store, name: &str, now: DateTime<Utc>) -> bool {
    let mut tables = store.write().await;
    match tables.nodes.get_mut(name) {
        Some(node) => {
            node.last_seen = now;
            node.active = true;
            true
        }
        None => false,
    }
}

/// Mark active nodes as inactive if they haven't been seen within `timeout`
/// Returns the names of the nodes that changed
pub async fn mark_stale_inactive(
    store: &Store,
    now: DateTime<Utc>,
    timeout: chrono::Duration,
) -> Vec<String> {
    let mut tables = store.write().await;
    let mut changed = Vec::new();

    for node in tables.nodes.values_mut() {
        if node.active && node.is_stale(now, timeout) {
            node.active = false;
            changed.push(node.name.clone());
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::create_store;
    use torc_core::config::NodeConfig;

    fn node(name: &str) -> Node {
        Node::from_config(&NodeConfig {
            name: name.to_string(),
            ip: "10.0.0.5".to_string(),
            node_type: "slave".to_string(),
            external_ip: Some("192.168.1.5".to_string()),
            management_ip: None,
            port: Some(3),
        })
    }

    #[tokio::test]
    async fn test_add_and_list_sorted() {
        let store = create_store();

        assert!(add(&store, node("worker-2")).await);
        assert!(add(&store, node("worker-1")).await);
        assert!(!add(&store, node("worker-1")).await);

        let names: Vec<String> = list_all(&store).await.into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["worker-1", "worker-2"]);
    }

    #[tokio::test]
    async fn test_update_keeps_fields_for_empty_values() {
        let store = create_store();
        add(&store, node("worker-1")).await;

        assert!(update(&store, "worker-1", "", "compute", "S-1").await);

        let stored = find_by_name(&store, "worker-1").await.unwrap();
        assert_eq!(stored.node_type, "slave");
        assert_eq!(stored.node_function, "compute");
        assert_eq!(stored.slave_id, "S-1");
        assert!(!update(&store, "missing", "a", "b", "c").await);
    }

    #[tokio::test]
    async fn test_touch_activates_node() {
        let store = create_store();
        add(&store, node("worker-1")).await;
        let now = Utc::now();

        assert!(touch(&store, "worker-1", now).await);

        let stored = find_by_name(&store, "worker-1").await.unwrap();
        assert!(stored.active);
        assert_eq!(stored.last_seen, now);
        assert!(!touch(&store, "missing", now).await);
    }

    #[tokio::test]
    async fn test_mark_stale_inactive_only_touches_stale_active_nodes() {
        let store = create_store();
        add(&store, node("fresh")).await;
        add(&store, node("stale")).await;
        add(&store, node("idle")).await;

        let now = Utc::now();
        touch(&store, "fresh", now).await;
        touch(&store, "stale", now - chrono::Duration::seconds(120)).await;

        let changed = mark_stale_inactive(&store, now, chrono::Duration::seconds(30)).await;

        assert_eq!(changed, vec!["stale"]);
        assert!(find_by_name(&store, "fresh").await.unwrap().active);
        assert!(!find_by_name(&store, "stale").await.unwrap().active);
    }
}
