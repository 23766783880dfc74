//! Service registry client
//!
//! Registers running tasks with the Consul agent on the master node.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use super::{REQUEST_TIMEOUT, http_client};

/// Port of the Consul agent HTTP API
pub const CONSUL_PORT: u16 = 8500;

/// Registration payload for the agent service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    pub name: String,
    pub address: String,
}

/// Client for the registry; a disabled registry accepts and drops every call
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    client: Client,
    endpoint: Option<String>,
}

impl ServiceRegistry {
    /// Registry served by the Consul agent on `master_ip`
    pub fn new(master_ip: &str) -> reqwest::Result<Self> {
        Self::with_endpoint(
            format!(
                "http://{}:{}/v1/agent/service/register",
                master_ip, CONSUL_PORT
            ),
            REQUEST_TIMEOUT,
        )
    }

    /// Registry posting to `endpoint`, giving up on a call after `timeout`
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: Some(endpoint.into()),
        })
    }

    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            endpoint: None,
        }
    }

    /// Registration URL, `None` when disabled
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Registers `name` at `address`
    ///
    /// Failures are logged and reported as `false`; callers carry on.
    pub async fn register(&self, name: &str, address: &str) -> bool {
        let Some(endpoint) = &self.endpoint else {
            return false;
        };

        let registration = ServiceRegistration {
            name: name.to_string(),
            address: address.to_string(),
        };

        match self.client.post(endpoint).json(&registration).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Registered {} at {}", name, address);
                true
            }
            Ok(response) => {
                tracing::warn!(
                    "Registry rejected {} with status {}",
                    name,
                    response.status()
                );
                false
            }
            Err(err) => {
                tracing::warn!("Failed to register {}: {}", name, err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_points_at_master_agent() {
        let registry = ServiceRegistry::new("10.0.0.1").unwrap();
        assert_eq!(
            registry.endpoint(),
            Some("http://10.0.0.1:8500/v1/agent/service/register")
        );
    }

    #[test]
    fn test_registration_payload_uses_agent_field_names() {
        let registration = ServiceRegistration {
            name: "web".to_string(),
            address: "192.168.0.7".to_string(),
        };

        let json = serde_json::to_value(&registration).unwrap();

        assert_eq!(json, serde_json::json!({"Name": "web", "Address": "192.168.0.7"}));
    }

    #[tokio::test]
    async fn test_disabled_registry_skips_calls() {
        let registry = ServiceRegistry::disabled();
        assert_eq!(registry.endpoint(), None);
        assert!(!registry.register("web", "192.168.0.7").await);
    }

    #[tokio::test]
    async fn test_unresponsive_registry_times_out() {
        // accepts connections through the backlog but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!(
            "http://{}/v1/agent/service/register",
            listener.local_addr().unwrap()
        );
        let registry =
            ServiceRegistry::with_endpoint(endpoint, Duration::from_millis(200)).unwrap();

        let registered = tokio::time::timeout(
            Duration::from_secs(5),
            registry.register("web", "192.168.0.7"),
        )
        .await;

        assert_eq!(registered, Ok(false));
    }
}
