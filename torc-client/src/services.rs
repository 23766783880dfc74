//! Task and service group endpoints

use torc_core::domain::task::Task;
use torc_core::dto::response::SimpleResponse;

use crate::ControllerClient;
use crate::error::Result;

impl ControllerClient {
    // =============================================================================
    // Queries
    // =============================================================================

    /// List running tasks that are not jobs
    pub async fn list_running(&self) -> Result<Vec<Task>> {
        let response = self.client.get(self.url("/services/running")).send().await?;

        self.handle_response(response).await
    }

    /// List running metered tasks
    pub async fn list_metered(&self) -> Result<Vec<Task>> {
        let response = self.client.get(self.url("/services/metered")).send().await?;

        self.handle_response(response).await
    }

    /// Resolve a task id prefix to a task name
    ///
    /// Returns `None` when no task matches.
    pub async fn lookup_service(&self, id_prefix: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.url("/service"))
            .query(&[("id", id_prefix)])
            .send()
            .await?;

        let body: SimpleResponse = self.handle_response(response).await?;
        Ok(Some(body.result).filter(|name| !name.is_empty()))
    }

    // =============================================================================
    // Lifecycle
    // =============================================================================

    /// Announce a running task to the controller
    pub async fn announce(&self, task: &Task) -> Result<()> {
        let response = self
            .client
            .post(self.url("/service/announce"))
            .json(task)
            .send()
            .await?;

        self.handle_response::<SimpleResponse>(response).await?;
        Ok(())
    }

    /// Kill a task by name
    pub async fn kill_service(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/service"))
            .query(&[("name", name)])
            .send()
            .await?;

        self.handle_response::<SimpleResponse>(response).await?;
        Ok(())
    }

    /// Start every service of a configured group
    pub async fn start_group(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .get(self.url("/start/group"))
            .query(&[("name", name)])
            .send()
            .await?;

        self.handle_response::<SimpleResponse>(response).await?;
        Ok(())
    }
}
