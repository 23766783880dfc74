//! Cluster configuration document
//!
//! The controller is driven by a single YAML document describing the node
//! inventory, bootstrap service addresses, polling policies and the
//! containerized services that should run on the cluster.
//!
//! Values may hold `$NAME` placeholders. The document is parsed as written
//! and [`ClusterConfig::resolve`] produces a copy with placeholders expanded.

pub mod error;
pub mod validation;
pub mod variables;

pub use error::{ConfigError, Result};
pub use validation::{Severity, ValidationFinding, ValidationReport};
pub use variables::Variables;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Controller name used when the document does not set one
pub const DEFAULT_CONTROLLER_NAME: &str = "torc-controller";

// =============================================================================
// Schema
// =============================================================================

/// Root of the configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterConfig {
    /// Name of the controller owning this cluster
    #[serde(default = "default_controller_name")]
    pub name: String,

    /// Address of the IPMI proxy used for node power control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipmiproxy: Option<String>,

    /// Machines in the cluster
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Bootstrap service endpoints registered for discovery
    #[serde(default)]
    pub dns_addons: Vec<DnsAddon>,

    /// Switch agent used to program host routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_agent: Option<NetworkAgentConfig>,

    pub statesync: StateSyncPolicy,
    pub stateclean: StateCleanPolicy,
    pub healthcheck: HealthCheckConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// A machine in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    pub ip: String,

    /// Node role, e.g. `master` or `slave`
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_ip: Option<String>,

    /// Switch port the node is attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
}

/// A bootstrap service endpoint (etcd, mesos-master, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsAddon {
    pub name: String,
    pub ip: String,
}

/// Connection settings for the switch agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAgentConfig {
    #[serde(rename = "type")]
    pub agent_type: String,

    /// `<host>:<port>`
    pub connection: String,
}

/// Known switch agent implementations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkAgentKind {
    Fboss,
    Snaproute,
    Undefined,
    Unknown(String),
}

impl NetworkAgentKind {
    /// Parses an agent type tag
    pub fn parse(tag: &str) -> Self {
        match tag {
            "fboss" => NetworkAgentKind::Fboss,
            "snaproute" => NetworkAgentKind::Snaproute,
            "" | "undefined" => NetworkAgentKind::Undefined,
            other => NetworkAgentKind::Unknown(other.to_string()),
        }
    }

    /// Whether routes can be programmed through this agent
    pub fn is_supported(&self) -> bool {
        matches!(self, NetworkAgentKind::Fboss | NetworkAgentKind::Snaproute)
    }
}

impl std::fmt::Display for NetworkAgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkAgentKind::Fboss => write!(f, "fboss"),
            NetworkAgentKind::Snaproute => write!(f, "snaproute"),
            NetworkAgentKind::Undefined => write!(f, "undefined"),
            NetworkAgentKind::Unknown(tag) => write!(f, "{}", tag),
        }
    }
}

impl NetworkAgentConfig {
    /// Agent implementation named by the type tag
    pub fn kind(&self) -> NetworkAgentKind {
        NetworkAgentKind::parse(&self.agent_type)
    }

    /// Splits the connection string into host and port
    pub fn endpoint(&self) -> Result<(String, u16)> {
        parse_endpoint(&self.connection)
    }
}

/// Parses a `<host>:<port>` string
pub fn parse_endpoint(value: &str) -> Result<(String, u16)> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::invalid_endpoint(value, "expected <host>:<port>"))?;

    if host.is_empty() {
        return Err(ConfigError::invalid_endpoint(value, "host is empty"));
    }

    let port = port
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid_endpoint(value, format!("invalid port '{}'", port)))?;

    Ok((host.to_string(), port))
}

/// Cadence of the state synchronisation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSyncPolicy {
    pub poll_interval_in_seconds: u64,
}

/// Cadence and thresholds of the stale state cleanup loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCleanPolicy {
    pub poll_interval_in_seconds: u64,

    /// Age after which an unrefreshed task or node is considered gone
    pub timeout_in_seconds: u64,

    pub restart_delay_in_seconds: u64,
}

/// Health-check cadence and the system services it covers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    pub poll_interval_in_seconds: u64,

    #[serde(default)]
    pub system_services: Vec<ServiceSpec>,
}

/// A containerized workload description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    pub image_name: String,

    #[serde(default)]
    pub arguments: String,

    /// Node role the service is placed on
    #[serde(default)]
    pub node_function: String,

    /// Container network mode, e.g. `host`
    #[serde(default)]
    pub network_type: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub privileged: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla: Option<Sla>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeMount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,

    /// Pin the service to a specific node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Service that must be running before this one starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_metered: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_job: bool,
}

/// Placement constraint for a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sla {
    /// Exactly one instance on every node of the matching role
    SingletonEachNode,
}

/// A host path mounted into a service container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub host_path: String,
    pub container_path: String,
    pub read_only_mode: bool,
}

/// User-facing API settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "service-groups", default)]
    pub service_groups: Vec<ServiceGroup>,
}

/// A named set of services started together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub name: String,

    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

fn default_controller_name() -> String {
    DEFAULT_CONTROLLER_NAME.to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

// =============================================================================
// Loading & Serialization
// =============================================================================

impl ClusterConfig {
    /// Parses a configuration document
    ///
    /// Only the first document of a multi-document stream is used.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document = serde_yaml::Deserializer::from_str(content)
            .next()
            .ok_or(ConfigError::EmptyDocument)?;

        Ok(ClusterConfig::deserialize(document)?)
    }

    /// Reads and parses a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&content)
    }

    /// Serializes the configuration back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Returns a copy with every placeholder expanded
    ///
    /// Fails with every unresolved name if any placeholder has no value.
    pub fn resolve(&self, variables: &Variables) -> Result<ClusterConfig> {
        let mut value = serde_yaml::to_value(self)?;
        let mut missing = BTreeSet::new();

        expand_value(&mut value, variables, &mut missing);

        if !missing.is_empty() {
            return Err(ConfigError::UnresolvedVariables(
                missing.into_iter().collect(),
            ));
        }

        Ok(serde_yaml::from_value(value)?)
    }

    /// Every placeholder name referenced in the document
    pub fn placeholders(&self) -> Result<Vec<String>> {
        let value = serde_yaml::to_value(self)?;
        let mut names = BTreeSet::new();
        collect_placeholders(&value, &mut names);
        Ok(names.into_iter().collect())
    }

    /// Runs every validation rule against the document
    pub fn validate(&self) -> ValidationReport {
        validation::validate(self)
    }

    // =============================================================================
    // Lookups
    // =============================================================================

    /// Finds a node by name
    pub fn node(&self, name: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Nodes with the given role
    pub fn nodes_with_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a NodeConfig> {
        self.nodes.iter().filter(move |node| node.node_type == node_type)
    }

    /// Finds a service group by name
    pub fn service_group(&self, name: &str) -> Option<&ServiceGroup> {
        self.api.service_groups.iter().find(|group| group.name == name)
    }

    /// Finds a health-checked system service by name
    pub fn system_service(&self, name: &str) -> Option<&ServiceSpec> {
        self.healthcheck
            .system_services
            .iter()
            .find(|service| service.name == name)
    }

    /// Network agent kind, `Undefined` when the section is absent
    pub fn network_agent_kind(&self) -> NetworkAgentKind {
        self.network_agent
            .as_ref()
            .map(NetworkAgentConfig::kind)
            .unwrap_or(NetworkAgentKind::Undefined)
    }
}

fn expand_value(value: &mut serde_yaml::Value, variables: &Variables, missing: &mut BTreeSet<String>) {
    match value {
        serde_yaml::Value::String(s) => {
            *s = variables.expand(s, missing);
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                expand_value(item, variables, missing);
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                expand_value(item, variables, missing);
            }
        }
        serde_yaml::Value::Tagged(tagged) => expand_value(&mut tagged.value, variables, missing),
        _ => {}
    }
}

fn collect_placeholders(value: &serde_yaml::Value, names: &mut BTreeSet<String>) {
    match value {
        serde_yaml::Value::String(s) => variables::placeholders_in(s, names),
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                collect_placeholders(item, names);
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, item) in map.iter() {
                collect_placeholders(item, names);
            }
        }
        serde_yaml::Value::Tagged(tagged) => collect_placeholders(&tagged.value, names),
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"
name: torc-controller
nodes:
  - name: master
    ip: $MASTER_IP
    type: master
  - name: worker-1
    ip: 10.250.3.21
    external_ip: 10.250.1.21
    management_ip: 10.250.2.21
    port: 7
    type: slave
dns-addons:
  - name: etcd
    ip: $MASTER_IP
  - name: mesos-master
    ip: $MASTER_IP
network-agent:
  type: snaproute
  connection: "$MASTER_IP:8080"
statesync:
  poll_interval_in_seconds: 5
stateclean:
  poll_interval_in_seconds: 10
  timeout_in_seconds: 30
  restart_delay_in_seconds: 15
healthcheck:
  poll_interval_in_seconds: 5
  system_services:
    - name: consul-agent
      image_name: gliderlabs/consul-agent
      arguments: "-advertise $MY_IP"
      node_function: slave
      network_type: host
      sla: singleton_each_node
    - name: calico-node
      image_name: calico/node
      arguments: ""
      node_function: slave
      network_type: host
      privileged: true
      volumes:
        - host_path: /lib/modules
          container_path: /lib/modules
          read_only_mode: true
api:
  service-groups: []
"#;

    #[test]
    fn test_parse_sample() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.name, "torc-controller");
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[0].node_type, "master");
        assert_eq!(config.nodes[1].port, Some(7));
        assert_eq!(config.dns_addons.len(), 2);
        assert_eq!(config.statesync.poll_interval_in_seconds, 5);
        assert_eq!(config.stateclean.restart_delay_in_seconds, 15);
        assert_eq!(config.healthcheck.system_services.len(), 2);
        assert!(config.api.service_groups.is_empty());

        let calico = config.system_service("calico-node").unwrap();
        assert!(calico.privileged);
        assert_eq!(calico.volumes[0].container_path, "/lib/modules");
        assert!(calico.volumes[0].read_only_mode);

        let consul = config.system_service("consul-agent").unwrap();
        assert_eq!(consul.sla, Some(Sla::SingletonEachNode));
        assert!(!consul.privileged);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();
        let rendered = config.to_yaml_string().unwrap();
        let reparsed = ClusterConfig::from_yaml_str(&rendered).unwrap();

        assert_eq!(config, reparsed);
        assert!(rendered.contains("dns-addons"));
        assert!(rendered.contains("service-groups"));
    }

    #[test]
    fn test_resolve_expands_placeholders() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();
        let vars = Variables::new()
            .with_master_ip("10.250.3.20")
            .with_my_ip("10.250.3.20");

        let resolved = config.resolve(&vars).unwrap();

        assert_eq!(resolved.nodes[0].ip, "10.250.3.20");
        assert_eq!(
            resolved.network_agent.as_ref().unwrap().connection,
            "10.250.3.20:8080"
        );
        assert_eq!(
            resolved.system_service("consul-agent").unwrap().arguments,
            "-advertise 10.250.3.20"
        );
        // untouched values survive
        assert_eq!(resolved.nodes[1].ip, "10.250.3.21");
        assert_eq!(resolved.stateclean, config.stateclean);
    }

    #[test]
    fn test_resolve_reports_all_missing_variables() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();

        let err = config.resolve(&Variables::new()).unwrap_err();

        match err {
            ConfigError::UnresolvedVariables(names) => {
                assert_eq!(names, vec!["MASTER_IP".to_string(), "MY_IP".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_keeps_escaped_shell_variables() {
        let doc = SAMPLE.replace(
            r#"arguments: """#,
            r#"arguments: "sh -c 'exec app --port $$PORT'""#,
        );
        let config = ClusterConfig::from_yaml_str(&doc).unwrap();
        let vars = Variables::new()
            .with_master_ip("10.250.3.20")
            .with_my_ip("10.250.3.20");

        let resolved = config.resolve(&vars).unwrap();

        assert_eq!(
            resolved.system_service("calico-node").unwrap().arguments,
            "sh -c 'exec app --port $PORT'"
        );
        assert_eq!(config.placeholders().unwrap(), vec!["MASTER_IP", "MY_IP"]);
    }

    #[test]
    fn test_placeholders() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.placeholders().unwrap(), vec!["MASTER_IP", "MY_IP"]);
    }

    #[test]
    fn test_name_defaults_to_controller() {
        let doc = r#"
statesync: { poll_interval_in_seconds: 1 }
stateclean: { poll_interval_in_seconds: 1, timeout_in_seconds: 1, restart_delay_in_seconds: 1 }
healthcheck: { poll_interval_in_seconds: 1 }
"#;
        let config = ClusterConfig::from_yaml_str(doc).unwrap();

        assert_eq!(config.name, DEFAULT_CONTROLLER_NAME);
        assert!(config.nodes.is_empty());
        assert_eq!(config.network_agent_kind(), NetworkAgentKind::Undefined);
    }

    #[test]
    fn test_negative_interval_is_rejected() {
        let doc = SAMPLE.replace("poll_interval_in_seconds: 10", "poll_interval_in_seconds: -10");
        assert!(matches!(
            ClusterConfig::from_yaml_str(&doc),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_non_boolean_read_only_mode_is_rejected() {
        let doc = SAMPLE.replace("read_only_mode: true", "read_only_mode: sometimes");
        assert!(ClusterConfig::from_yaml_str(&doc).is_err());
    }

    #[test]
    fn test_unknown_sla_is_rejected() {
        let doc = SAMPLE.replace("sla: singleton_each_node", "sla: everywhere");
        assert!(ClusterConfig::from_yaml_str(&doc).is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(ClusterConfig::from_yaml_str("").is_err());
        assert!(ClusterConfig::from_yaml_str("# nothing here\n").is_err());
    }

    #[test]
    fn test_only_first_document_is_used() {
        let doc = format!("{}\n---\nname: other\n", SAMPLE);
        let config = ClusterConfig::from_yaml_str(&doc).unwrap();
        assert_eq!(config.name, "torc-controller");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torc.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ClusterConfig::from_file(&path).unwrap();
        assert_eq!(config.nodes.len(), 2);

        let missing = ClusterConfig::from_file(dir.path().join("missing.yml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_lookups() {
        let config = ClusterConfig::from_yaml_str(SAMPLE).unwrap();

        assert!(config.node("worker-1").is_some());
        assert!(config.node("worker-9").is_none());
        assert_eq!(config.nodes_with_type("slave").count(), 1);
        assert!(config.service_group("web").is_none());
        assert_eq!(config.network_agent_kind(), NetworkAgentKind::Snaproute);
    }

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            parse_endpoint("10.0.0.1:8080").unwrap(),
            ("10.0.0.1".to_string(), 8080)
        );
        assert!(parse_endpoint("10.0.0.1").is_err());
        assert!(parse_endpoint(":8080").is_err());
        assert!(parse_endpoint("10.0.0.1:http").is_err());
        assert!(parse_endpoint("10.0.0.1:70000").is_err());
    }

    #[test]
    fn test_network_agent_kind() {
        assert_eq!(NetworkAgentKind::parse("fboss"), NetworkAgentKind::Fboss);
        assert_eq!(NetworkAgentKind::parse("undefined"), NetworkAgentKind::Undefined);
        assert_eq!(
            NetworkAgentKind::parse("arista"),
            NetworkAgentKind::Unknown("arista".to_string())
        );
        assert!(NetworkAgentKind::Snaproute.is_supported());
        assert!(!NetworkAgentKind::Undefined.is_supported());
    }
}
