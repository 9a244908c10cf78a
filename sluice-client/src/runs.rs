//! Run-status API endpoints
//!
//! Read-only: the orchestrator owns run state, the client only displays it.

use crate::OrchestratorClient;
use crate::error::Result;
use sluice_core::dto::run::RunDto;
use uuid::Uuid;

impl OrchestratorClient {
    /// List runs of a pipeline
    ///
    /// # Arguments
    /// * `pipeline_id` - The pipeline UUID
    pub async fn list_runs(&self, pipeline_id: Uuid) -> Result<Vec<RunDto>> {
        let url = format!("{}/api/pipeline/{}/runs", self.base_url, pipeline_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get a run by ID
    ///
    /// # Arguments
    /// * `run_id` - The run UUID
    pub async fn get_run(&self, run_id: Uuid) -> Result<RunDto> {
        let url = format!("{}/api/runs/{}", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
