//! Collaborators
//!
//! Outbound integrations of the controller: the service registry, the
//! switch agent that carries host routes to running tasks, and the node
//! agents that set up the calico network.

pub mod calico;
pub mod network_agent;
pub mod registry;

pub use calico::CalicoClient;
pub use network_agent::NetworkAgent;
pub use registry::ServiceRegistry;

use std::time::Duration;

use reqwest::Client;

/// Upper bound on a single outbound call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for cluster-internal endpoints
///
/// Proxy settings from the environment are ignored; collaborators are
/// addressed by their cluster IPs.
fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).no_proxy().build()
}
