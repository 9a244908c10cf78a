//! Pipeline DTOs for orchestrator communication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::Pipeline;

/// Request to register a validated descriptor with the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPipeline {
    pub pipeline: Pipeline,
}

/// Orchestrator-side record of a registered pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredPipeline {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub registered_at: DateTime<Utc>,
}
