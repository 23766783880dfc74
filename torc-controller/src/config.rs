//! Controller settings
//!
//! Process-level parameters read from the environment. The cluster itself is
//! described by the YAML file named here.

use std::path::PathBuf;

/// Controller process settings
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Cluster configuration file
    pub config_file: PathBuf,

    /// Address of the master node, substituted for `$MASTER_IP`
    pub master_ip: String,

    /// Address of this host, substituted for `$MY_IP`
    pub my_ip: String,

    /// Address the HTTP API listens on
    pub bind_addr: String,

    /// Whether running tasks are registered with the service registry
    pub registry_enabled: bool,

    /// Whether calico commands are sent to the node agents
    pub node_agents_enabled: bool,
}

impl ControllerSettings {
    /// Creates settings with defaults for everything but the master address
    pub fn new(master_ip: impl Into<String>) -> Self {
        let master_ip = master_ip.into();
        Self {
            config_file: PathBuf::from("torc.yml"),
            my_ip: master_ip.clone(),
            master_ip,
            bind_addr: "0.0.0.0:3000".to_string(),
            registry_enabled: true,
            node_agents_enabled: true,
        }
    }

    /// Creates settings from environment variables
    ///
    /// Expected environment variables:
    /// - MASTER_IP (required)
    /// - MY_IP (optional, default: MASTER_IP)
    /// - TORC_CONFIG_FILE (optional, default: torc.yml)
    /// - TORC_BIND_ADDR (optional, default: 0.0.0.0:3000)
    /// - TORC_REGISTRY_ENABLED (optional, default: true)
    /// - TORC_NODE_AGENTS_ENABLED (optional, default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        let master_ip = std::env::var("MASTER_IP")
            .map_err(|_| anyhow::anyhow!("MASTER_IP environment variable not set"))?;

        let mut settings = Self::new(master_ip);

        if let Ok(my_ip) = std::env::var("MY_IP") {
            settings.my_ip = my_ip;
        }

        if let Ok(path) = std::env::var("TORC_CONFIG_FILE") {
            settings.config_file = PathBuf::from(path);
        }

        if let Ok(addr) = std::env::var("TORC_BIND_ADDR") {
            settings.bind_addr = addr;
        }

        settings.registry_enabled = std::env::var("TORC_REGISTRY_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        settings.node_agents_enabled = std::env::var("TORC_NODE_AGENTS_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        Ok(settings)
    }

    /// Validates the settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.master_ip.trim().is_empty() {
            anyhow::bail!("master_ip cannot be empty");
        }

        if self.my_ip.trim().is_empty() {
            anyhow::bail!("my_ip cannot be empty");
        }

        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("bind_addr must be <ip>:<port>, got '{}'", self.bind_addr);
        }

        if self.config_file.as_os_str().is_empty() {
            anyhow::bail!("config_file cannot be empty");
        }

        Ok(())
    }
}
