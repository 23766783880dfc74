//! Liveness, configuration and network endpoints

use torc_core::config::ClusterConfig;
use torc_core::dto::response::SimpleResponse;
use torc_core::dto::route::RouteEntry;

use crate::ControllerClient;
use crate::error::Result;

impl ControllerClient {
    /// Ping the controller; returns the reply body (`pong`)
    pub async fn ping(&self) -> Result<String> {
        let response = self.client.get(self.url("/admin/ping")).send().await?;

        self.handle_text_response(response).await
    }

    /// Fetch the resolved cluster configuration
    pub async fn get_config(&self) -> Result<ClusterConfig> {
        let response = self.client.get(self.url("/config")).send().await?;

        self.handle_response(response).await
    }

    /// List the host routes programmed through the network agent
    pub async fn list_routes(&self) -> Result<Vec<RouteEntry>> {
        let response = self.client.get(self.url("/routes")).send().await?;

        self.handle_response(response).await
    }

    /// Set up the calico network on the slave nodes
    pub async fn configure_calico(&self) -> Result<()> {
        let response = self.client.get(self.url("/calico/configure")).send().await?;

        self.handle_response::<SimpleResponse>(response).await?;
        Ok(())
    }

    /// Tear the calico network down on the slave nodes
    pub async fn shutdown_calico(&self) -> Result<()> {
        let response = self.client.get(self.url("/calico/shutdown")).send().await?;

        self.handle_response::<SimpleResponse>(response).await?;
        Ok(())
    }
}
