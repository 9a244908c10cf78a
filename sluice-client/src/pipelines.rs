//! Pipeline-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use sluice_core::dto::pipeline::{RegisterPipeline, RegisteredPipeline};
use uuid::Uuid;

impl OrchestratorClient {
    /// Register a validated pipeline descriptor
    ///
    /// # Arguments
    /// * `req` - The registration request carrying the descriptor
    ///
    /// # Returns
    /// The orchestrator's record of the registered pipeline
    ///
    /// # Example
    /// ```no_run
    /// # use sluice_client::OrchestratorClient;
    /// # use sluice_core::dto::pipeline::RegisterPipeline;
    /// # use sluice_core::retail::{self, RetailParams};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = OrchestratorClient::new("http://localhost:8080");
    /// let pipeline = retail::build(&RetailParams::default())?;
    /// let registered = client.register_pipeline(RegisterPipeline { pipeline }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register_pipeline(&self, req: RegisterPipeline) -> Result<RegisteredPipeline> {
        let url = format!("{}/api/pipeline/register", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List all registered pipelines
    pub async fn list_pipelines(&self) -> Result<Vec<RegisteredPipeline>> {
        let url = format!("{}/api/pipeline/list", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a registered pipeline by ID
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline UUID
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<RegisteredPipeline> {
        let url = format!("{}/api/pipeline/{}", self.base_url, pipeline_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a registered pipeline
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline UUID to delete
    pub async fn delete_pipeline(&self, pipeline_id: Uuid) -> Result<()> {
        let url = format!("{}/api/pipeline/{}", self.base_url, pipeline_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
