//! Calico network setup through the node agents
//!
//! Every node runs an agent that executes the shell commands posted to its
//! `/sync` endpoint. Each slave node starts the calico node; the IP pool and
//! the docker network are cluster-wide and are created through the first
//! slave only.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use torc_core::domain::node::Node;

use super::{REQUEST_TIMEOUT, http_client};

/// Port of the node agent HTTP API
pub const NODE_AGENT_PORT: u16 = 8085;

/// Address pool calico assigns task addresses from
pub const IP_POOL: &str = "192.168.0.0/16";

/// Docker network tasks attach to
pub const NETWORK_NAME: &str = "torc";

const CALICOCTL: &str = "/home/bladerunner/calicoctl";
const ETCD_ENV: &str = "ETCD_AUTHORITY=etcd.service.torc:2379";
const SLAVE: &str = "slave";

/// A shell command for the agent on one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCommand {
    /// Node the command is sent to
    #[serde(skip)]
    pub ip: String,

    pub cmd: String,

    /// Environment assignment the command runs with, may be empty
    pub env: String,
}

impl NodeCommand {
    fn calicoctl(node: &Node, args: &str) -> Self {
        Self {
            ip: node.ip.clone(),
            cmd: format!("{} {}", CALICOCTL, args),
            env: ETCD_ENV.to_string(),
        }
    }

    fn docker_network(node: &Node, args: &str) -> Self {
        Self {
            ip: node.ip.clone(),
            cmd: format!("docker network {}", args),
            env: String::new(),
        }
    }
}

fn slaves(nodes: &[Node]) -> impl Iterator<Item = &Node> {
    nodes.iter().filter(|node| node.node_type == SLAVE)
}

/// Commands that bring the calico network up
///
/// The calico node starts on every slave before the pool and the network
/// are created.
pub fn plan_configure(nodes: &[Node]) -> Vec<NodeCommand> {
    let mut commands: Vec<NodeCommand> = slaves(nodes)
        .map(|node| NodeCommand::calicoctl(node, "node --libnetwork"))
        .collect();

    if let Some(first) = slaves(nodes).next() {
        commands.push(NodeCommand::calicoctl(
            first,
            &format!("pool add {} --nat-outgoing", IP_POOL),
        ));
        commands.push(NodeCommand::docker_network(
            first,
            &format!("create --driver calico --ipam-driver calico {}", NETWORK_NAME),
        ));
    }

    commands
}

/// Commands that tear the calico network down
pub fn plan_shutdown(nodes: &[Node]) -> Vec<NodeCommand> {
    let mut commands = Vec::new();
    for node in slaves(nodes) {
        commands.push(NodeCommand::calicoctl(node, "node stop"));
        commands.push(NodeCommand::calicoctl(node, "node remove --remove-endpoints"));
    }

    if let Some(first) = slaves(nodes).next() {
        commands.push(NodeCommand::calicoctl(
            first,
            &format!("pool remove {}", IP_POOL),
        ));
        commands.push(NodeCommand::docker_network(
            first,
            &format!("rm {}", NETWORK_NAME),
        ));
    }

    commands
}

/// Client for the node agents; a disabled client sends nothing
#[derive(Debug, Clone)]
pub struct CalicoClient {
    client: Client,
    port: u16,
    enabled: bool,
}

impl CalicoClient {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_port(NODE_AGENT_PORT, REQUEST_TIMEOUT)
    }

    /// Client for agents listening on `port`, giving up on a call after `timeout`
    pub fn with_port(port: u16, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            port,
            enabled: true,
        })
    }

    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            port: NODE_AGENT_PORT,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sends one command; failures are logged and reported as `false`
    pub async fn send(&self, command: &NodeCommand) -> bool {
        if !self.enabled {
            return false;
        }

        let url = format!("http://{}:{}/sync", command.ip, self.port);

        match self.client.post(&url).json(command).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Node {} accepted: {}", command.ip, command.cmd);
                true
            }
            Ok(response) => {
                tracing::warn!(
                    "Node {} rejected '{}' with status {}",
                    command.ip,
                    command.cmd,
                    response.status()
                );
                false
            }
            Err(err) => {
                tracing::warn!("Failed to send '{}' to {}: {}", command.cmd, command.ip, err);
                false
            }
        }
    }

    /// Sends the commands in order and returns how many were accepted
    pub async fn apply(&self, commands: &[NodeCommand]) -> usize {
        if !self.enabled {
            tracing::debug!("Node agents disabled, skipping {} command(s)", commands.len());
            return 0;
        }

        let mut accepted = 0;
        for command in commands {
            if self.send(command).await {
                accepted += 1;
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use chrono::Utc;
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    fn node(name: &str, ip: &str, node_type: &str) -> Node {
        Node {
            name: name.to_string(),
            ip: ip.to_string(),
            external_ip: String::new(),
            management_ip: String::new(),
            port_id: 0,
            node_type: node_type.to_string(),
            node_function: "none".to_string(),
            active: true,
            slave_id: String::new(),
            last_seen: Utc::now(),
        }
    }

    fn cluster() -> Vec<Node> {
        vec![
            node("master", "10.0.0.1", "master"),
            node("worker-1", "10.0.0.21", "slave"),
            node("worker-2", "10.0.0.22", "slave"),
        ]
    }

    fn targets(commands: &[NodeCommand]) -> Vec<&str> {
        commands.iter().map(|c| c.ip.as_str()).collect()
    }

    #[test]
    fn test_configure_starts_calico_on_every_slave() {
        let commands = plan_configure(&cluster());

        assert_eq!(
            targets(&commands),
            vec!["10.0.0.21", "10.0.0.22", "10.0.0.21", "10.0.0.21"]
        );
        assert_eq!(
            commands[0].cmd,
            "/home/bladerunner/calicoctl node --libnetwork"
        );
        assert_eq!(commands[1].env, "ETCD_AUTHORITY=etcd.service.torc:2379");
    }

    #[test]
    fn test_configure_creates_pool_and_network_once() {
        let commands = plan_configure(&cluster());

        let pools: Vec<_> = commands.iter().filter(|c| c.cmd.contains("pool add")).collect();
        let networks: Vec<_> = commands
            .iter()
            .filter(|c| c.cmd.starts_with("docker network create"))
            .collect();

        assert_eq!(pools.len(), 1);
        assert_eq!(
            pools[0].cmd,
            "/home/bladerunner/calicoctl pool add 192.168.0.0/16 --nat-outgoing"
        );
        assert_eq!(networks.len(), 1);
        assert_eq!(
            networks[0].cmd,
            "docker network create --driver calico --ipam-driver calico torc"
        );
        assert_eq!(networks[0].env, "");
    }

    #[test]
    fn test_shutdown_mirrors_configure() {
        let commands = plan_shutdown(&cluster());

        let cmds: Vec<&str> = commands.iter().map(|c| c.cmd.as_str()).collect();
        assert_eq!(
            cmds,
            vec![
                "/home/bladerunner/calicoctl node stop",
                "/home/bladerunner/calicoctl node remove --remove-endpoints",
                "/home/bladerunner/calicoctl node stop",
                "/home/bladerunner/calicoctl node remove --remove-endpoints",
                "/home/bladerunner/calicoctl pool remove 192.168.0.0/16",
                "docker network rm torc",
            ]
        );
        assert_eq!(
            targets(&commands),
            vec!["10.0.0.21", "10.0.0.21", "10.0.0.22", "10.0.0.22", "10.0.0.21", "10.0.0.21"]
        );
    }

    #[test]
    fn test_no_slaves_no_commands() {
        let nodes = vec![node("master", "10.0.0.1", "master")];

        assert!(plan_configure(&nodes).is_empty());
        assert!(plan_shutdown(&nodes).is_empty());
    }

    #[test]
    fn test_command_body_omits_target() {
        let command = &plan_configure(&cluster())[0];

        let json = serde_json::to_value(command).unwrap();

        assert_eq!(
            json,
            json!({
                "cmd": "/home/bladerunner/calicoctl node --libnetwork",
                "env": "ETCD_AUTHORITY=etcd.service.torc:2379"
            })
        );
    }

    #[tokio::test]
    async fn test_disabled_client_sends_nothing() {
        let client = CalicoClient::disabled();

        assert!(!client.is_enabled());
        assert_eq!(client.apply(&plan_configure(&cluster())).await, 0);
    }

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn record(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
        received.lock().await.push(body);
        StatusCode::ACCEPTED
    }

    #[tokio::test]
    async fn test_apply_posts_commands_to_agents() {
        let received: Received = Arc::default();
        let app = Router::new()
            .route("/sync", post(record))
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let nodes = vec![node("local", "127.0.0.1", "slave")];
        let client = CalicoClient::with_port(port, Duration::from_secs(5)).unwrap();

        let accepted = client.apply(&plan_configure(&nodes)).await;

        assert_eq!(accepted, 3);
        let bodies = received.lock().await;
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0]["cmd"], "/home/bladerunner/calicoctl node --libnetwork");
        assert_eq!(
            bodies[2]["cmd"],
            "docker network create --driver calico --ipam-driver calico torc"
        );
    }
}
