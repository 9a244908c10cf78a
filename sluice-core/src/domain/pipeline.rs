//! Pipeline descriptor types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::builder::execution_order;
use crate::domain::step::Step;
use crate::error::{ConfigError, Result};

/// Scheduling attributes passed through to the external orchestrator
///
/// Opaque from the descriptor's point of view: the orchestrator interprets
/// these fields, the descriptor only carries them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Earliest date the orchestrator may consider for runs
    pub start_date: NaiveDate,
    /// Cron expression; `None` means manual triggering only
    pub cron: Option<String>,
    /// Whether the orchestrator should backfill runs missed before now
    pub catchup: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid literal date"),
            cron: None,
            catchup: false,
        }
    }
}

/// An immutable, validated pipeline descriptor
///
/// Produced by [`PipelineBuilder`](crate::builder::PipelineBuilder) and never
/// mutated afterwards. The descriptor has exactly one state: built. Per-step
/// execution state (pending/running/succeeded/failed) is owned and mutated
/// solely by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    pub tags: Vec<String>,
    pub schedule: Schedule,
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Look up a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Step names in a valid execution order
    ///
    /// Recomputes the topological order of the upstream relation. On a
    /// builder-produced descriptor this cannot fail; on a hand-edited one it
    /// reports the same [`ConfigError`] the builder would have.
    pub fn execution_order(&self) -> Result<Vec<&str>> {
        execution_order(&self.steps)
    }

    /// Serialize the descriptor to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a descriptor from JSON
    ///
    /// Runs full builder validation after parsing, so a descriptor loaded
    /// from disk carries the same guarantees as a freshly built one.
    pub fn from_json(json: &str) -> Result<Self> {
        let pipeline: Pipeline =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        crate::builder::validate(&pipeline.name, &pipeline.steps)?;
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PipelineBuilder;
    use crate::domain::step::StepKind;

    fn chain() -> Pipeline {
        PipelineBuilder::new("ingest")
            .step(Step::new("a", StepKind::FileUpload).param("src", "x"))
            .step(Step::new("b", StepKind::BulkLoad).after("a"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_step_lookup() {
        let pipeline = chain();
        assert_eq!(pipeline.step("b").unwrap().kind, StepKind::BulkLoad);
        assert!(pipeline.step("missing").is_none());
    }

    #[test]
    fn test_json_round_trip_preserves_structure() {
        let pipeline = chain();
        let json = pipeline.to_json().unwrap();
        let parsed = Pipeline::from_json(&json).unwrap();
        assert_eq!(parsed, pipeline);
    }

    #[test]
    fn test_from_json_revalidates() {
        // Hand-edited descriptor with a cycle must be rejected on load.
        let json = r#"{
            "name": "bad",
            "tags": [],
            "schedule": { "start_date": "2023-01-01", "cron": null, "catchup": false },
            "steps": [
                { "name": "a", "kind": "FILE_UPLOAD", "params": {}, "upstream": ["b"] },
                { "name": "b", "kind": "BULK_LOAD", "params": {}, "upstream": ["a"] }
            ]
        }"#;
        let err = Pipeline::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn test_default_schedule_is_manual() {
        let schedule = Schedule::default();
        assert!(schedule.cron.is_none());
        assert!(!schedule.catchup);
    }
}
