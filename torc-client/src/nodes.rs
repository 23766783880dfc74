//! Node endpoints

use torc_core::domain::node::Node;
use torc_core::dto::node::NodeHeartbeat;

use crate::ControllerClient;
use crate::error::Result;

impl ControllerClient {
    /// List all nodes
    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        let response = self.client.get(self.url("/nodes")).send().await?;

        self.handle_response(response).await
    }

    /// Get a node by name
    pub async fn get_node(&self, name: &str) -> Result<Node> {
        let response = self
            .client
            .get(self.url(&format!("/node/{}", name)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Report a node as alive
    pub async fn send_heartbeat(&self, name: &str, report: &NodeHeartbeat) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/node/{}/heartbeat", name)))
            .json(report)
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
