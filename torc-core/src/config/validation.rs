//! Configuration validation
//!
//! Structural checks that the parser cannot express on its own: required
//! strings being non-empty, unique names, usable intervals and well-formed
//! addresses. Every rule runs and all findings are reported together.

use std::collections::HashSet;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::variables::has_placeholders;
use super::{ClusterConfig, ServiceSpec, Sla, parse_endpoint};

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document cannot be used as-is
    Error,
    /// Suspicious but usable
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,

    /// Stable identifier of the rule that fired
    pub code: String,

    pub message: String,

    /// Location in the document, e.g. `nodes[1].ip`
    pub path: String,
}

impl ValidationFinding {
    /// Creates an error finding
    pub fn error(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            path: path.into(),
        }
    }

    /// Creates a warning finding
    pub fn warning(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}: {}", self.severity, self.code, self.path, self.message)
    }
}

/// All findings for a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// True when no finding is an error
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    /// Findings reported for a path
    pub fn at(&self, path: &str) -> Vec<&ValidationFinding> {
        self.findings.iter().filter(|finding| finding.path == path).collect()
    }

    fn push(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
    }

    fn require(&mut self, value: &str, path: String) {
        if value.trim().is_empty() {
            self.push(ValidationFinding::error("empty-field", "must not be empty", path));
        }
    }
}

/// Runs every rule against `config`
pub fn validate(config: &ClusterConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.require(&config.name, "name".to_string());

    validate_nodes(config, &mut report);
    validate_dns_addons(config, &mut report);
    validate_network_agent(config, &mut report);
    validate_policies(config, &mut report);

    let node_types: HashSet<&str> = config.nodes.iter().map(|n| n.node_type.as_str()).collect();

    let mut service_names = HashSet::new();
    for (i, service) in config.healthcheck.system_services.iter().enumerate() {
        let path = format!("healthcheck.system_services[{}]", i);
        if !service.name.is_empty() && !service_names.insert(service.name.as_str()) {
            report.push(ValidationFinding::error(
                "duplicate-name",
                format!("system service '{}' is defined more than once", service.name),
                format!("{}.name", path),
            ));
        }
        validate_service(service, &path, &node_types, &mut report);
    }

    let mut group_names = HashSet::new();
    for (i, group) in config.api.service_groups.iter().enumerate() {
        let path = format!("api.service-groups[{}]", i);
        report.require(&group.name, format!("{}.name", path));
        if !group.name.is_empty() && !group_names.insert(group.name.as_str()) {
            report.push(ValidationFinding::error(
                "duplicate-name",
                format!("service group '{}' is defined more than once", group.name),
                format!("{}.name", path),
            ));
        }
        for (j, service) in group.services.iter().enumerate() {
            validate_service(
                service,
                &format!("{}.services[{}]", path, j),
                &node_types,
                &mut report,
            );
        }
    }

    report
}

fn validate_nodes(config: &ClusterConfig, report: &mut ValidationReport) {
    let mut names = HashSet::new();

    for (i, node) in config.nodes.iter().enumerate() {
        let path = format!("nodes[{}]", i);
        report.require(&node.name, format!("{}.name", path));
        report.require(&node.ip, format!("{}.ip", path));
        report.require(&node.node_type, format!("{}.type", path));

        if !node.name.is_empty() && !names.insert(node.name.as_str()) {
            report.push(ValidationFinding::error(
                "duplicate-name",
                format!("node '{}' is defined more than once", node.name),
                format!("{}.name", path),
            ));
        }

        check_ip(&node.ip, format!("{}.ip", path), report);
        if let Some(external_ip) = &node.external_ip {
            check_ip(external_ip, format!("{}.external_ip", path), report);
        }
    }
}

fn validate_dns_addons(config: &ClusterConfig, report: &mut ValidationReport) {
    for (i, addon) in config.dns_addons.iter().enumerate() {
        let path = format!("dns-addons[{}]", i);
        for (field, value) in [("name", &addon.name), ("ip", &addon.ip)] {
            if value.trim().is_empty() {
                report.push(ValidationFinding::warning(
                    "empty-field",
                    "addon will not be registered",
                    format!("{}.{}", path, field),
                ));
            }
        }
        check_ip(&addon.ip, format!("{}.ip", path), report);
    }
}

fn validate_network_agent(config: &ClusterConfig, report: &mut ValidationReport) {
    let Some(agent) = &config.network_agent else {
        return;
    };

    let port = agent
        .connection
        .rsplit_once(':')
        .map(|(_, port)| port)
        .unwrap_or_default();

    // a templated port can only be checked once resolved
    if has_placeholders(port) {
        return;
    }

    if let Err(err) = parse_endpoint(&agent.connection) {
        report.push(ValidationFinding::error(
            "invalid-endpoint",
            err.to_string(),
            "network-agent.connection",
        ));
    }
}

fn validate_policies(config: &ClusterConfig, report: &mut ValidationReport) {
    let intervals = [
        ("statesync.poll_interval_in_seconds", config.statesync.poll_interval_in_seconds),
        ("stateclean.poll_interval_in_seconds", config.stateclean.poll_interval_in_seconds),
        ("healthcheck.poll_interval_in_seconds", config.healthcheck.poll_interval_in_seconds),
    ];

    for (path, seconds) in intervals {
        if seconds == 0 {
            report.push(ValidationFinding::warning(
                "zero-interval",
                "a zero poll interval never lets the loop wait",
                path,
            ));
        }
    }

    let clean = &config.stateclean;
    if clean.timeout_in_seconds < clean.poll_interval_in_seconds {
        report.push(ValidationFinding::warning(
            "timeout-below-interval",
            format!(
                "timeout ({}s) is shorter than the cleanup interval ({}s)",
                clean.timeout_in_seconds, clean.poll_interval_in_seconds
            ),
            "stateclean.timeout_in_seconds",
        ));
    }
}

fn validate_service(
    service: &ServiceSpec,
    path: &str,
    node_types: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    report.require(&service.name, format!("{}.name", path));
    report.require(&service.image_name, format!("{}.image_name", path));

    if !service.node_function.is_empty() && !node_types.contains(service.node_function.as_str()) {
        report.push(ValidationFinding::warning(
            "unknown-node-function",
            format!("no node has type '{}'", service.node_function),
            format!("{}.node_function", path),
        ));
    }

    if service.sla == Some(Sla::SingletonEachNode) && service.node_name.is_some() {
        report.push(ValidationFinding::warning(
            "sla-pinned-node",
            "singleton_each_node conflicts with a fixed node_name",
            format!("{}.sla", path),
        ));
    }

    for (i, volume) in service.volumes.iter().enumerate() {
        let volume_path = format!("{}.volumes[{}]", path, i);
        report.require(&volume.host_path, format!("{}.host_path", volume_path));
        report.require(&volume.container_path, format!("{}.container_path", volume_path));
    }
}

fn check_ip(value: &str, path: String, report: &mut ValidationReport) {
    if value.trim().is_empty() || has_placeholders(value) {
        return;
    }

    if value.parse::<IpAddr>().is_err() {
        report.push(ValidationFinding::error(
            "invalid-ip",
            format!("'{}' is not an IP address", value),
            path,
        ));
    }
}
