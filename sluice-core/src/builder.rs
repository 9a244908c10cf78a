//! Explicit pipeline builder
//!
//! Steps are constructed as plain values and appended in order; nothing
//! registers itself into an ambient context and there are no shared mutable
//! defaults between pipelines. [`PipelineBuilder::build`] runs the only
//! validation in the system and either returns a complete descriptor or a
//! [`ConfigError`] with no partial value. No I/O happens here: connecting to
//! storage, the warehouse, or the transform engine is the orchestrator's job
//! at execution time.

use std::collections::HashSet;

use crate::domain::pipeline::{Pipeline, Schedule};
use crate::domain::step::Step;
use crate::error::{ConfigError, Result};

/// Builder for an immutable [`Pipeline`] descriptor
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    name: String,
    tags: Vec<String>,
    schedule: Schedule,
    steps: Vec<Step>,
}

impl PipelineBuilder {
    /// Start a builder for a pipeline with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a classification tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the scheduling attributes handed to the orchestrator
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Append a step in declaration order
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate and freeze the descriptor
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the pipeline name is empty, a step name
    /// is empty or duplicated, a parameter value is empty, an upstream
    /// reference names no step, or the upstream relation is cyclic. On error
    /// no partial pipeline is produced.
    pub fn build(self) -> Result<Pipeline> {
        validate(&self.name, &self.steps)?;
        Ok(Pipeline {
            name: self.name,
            tags: self.tags,
            schedule: self.schedule,
            steps: self.steps,
        })
    }
}

/// Validate a step list against the descriptor invariants
///
/// Shared between the builder and descriptor deserialization so a pipeline
/// loaded from disk is held to the same rules as a freshly built one.
pub(crate) fn validate(pipeline_name: &str, steps: &[Step]) -> Result<()> {
    if pipeline_name.trim().is_empty() {
        return Err(ConfigError::EmptyField {
            field: "pipeline.name".to_string(),
        });
    }

    let mut names: HashSet<&str> = HashSet::with_capacity(steps.len());
    for step in steps {
        if step.name.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "step.name".to_string(),
            });
        }
        if !names.insert(step.name.as_str()) {
            return Err(ConfigError::DuplicateStep {
                name: step.name.clone(),
            });
        }
        for (param, value) in &step.params {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyParam {
                    step: step.name.clone(),
                    param: param.clone(),
                });
            }
        }
    }

    for step in steps {
        for upstream in &step.upstream {
            if upstream == &step.name {
                return Err(ConfigError::SelfReference {
                    step: step.name.clone(),
                });
            }
            if !names.contains(upstream.as_str()) {
                return Err(ConfigError::UnknownUpstream {
                    step: step.name.clone(),
                    upstream: upstream.clone(),
                });
            }
        }
    }

    execution_order(steps)?;
    Ok(())
}

/// Topological order of the upstream relation (Kahn's algorithm)
///
/// Deterministic: among ready steps, declaration order wins. Assumes names
/// are unique and upstream references resolve; callers go through
/// [`validate`] first for a meaningful error on those.
pub(crate) fn execution_order(steps: &[Step]) -> Result<Vec<&str>> {
    let mut indegree: Vec<usize> = steps.iter().map(|s| s.upstream.len()).collect();
    let mut emitted = vec![false; steps.len()];
    let mut order = Vec::with_capacity(steps.len());

    while order.len() < steps.len() {
        let ready = steps
            .iter()
            .enumerate()
            .position(|(i, _)| !emitted[i] && indegree[i] == 0);
        let Some(i) = ready else {
            // Everything left has a predecessor still pending: a cycle.
            let stuck = steps
                .iter()
                .enumerate()
                .find(|(i, _)| !emitted[*i])
                .map(|(_, s)| s.name.clone())
                .unwrap_or_default();
            return Err(ConfigError::DependencyCycle { step: stuck });
        };
        emitted[i] = true;
        order.push(steps[i].name.as_str());
        for (j, step) in steps.iter().enumerate() {
            if !emitted[j] {
                // Counted, not `any`: a duplicated upstream entry contributed
                // twice to the indegree.
                indegree[j] -= step.upstream.iter().filter(|u| *u == &steps[i].name).count();
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::step::StepKind;

    fn step(name: &str) -> Step {
        Step::new(name, StepKind::TransformRun)
    }

    #[test]
    fn test_build_empty_pipeline_name_fails() {
        let err = PipelineBuilder::new("").step(step("a")).build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyField {
                field: "pipeline.name".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_duplicate_step_names() {
        let err = PipelineBuilder::new("p")
            .step(step("a"))
            .step(step("a"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateStep {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_unknown_upstream() {
        let err = PipelineBuilder::new("p")
            .step(step("a").after("ghost"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownUpstream {
                step: "a".to_string(),
                upstream: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_self_reference() {
        let err = PipelineBuilder::new("p")
            .step(step("a").after("a"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::SelfReference {
                step: "a".to_string()
            }
        );
    }

    #[test]
    fn test_build_rejects_cycle() {
        let err = PipelineBuilder::new("p")
            .step(step("a").after("b"))
            .step(step("b").after("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DependencyCycle { .. }));
    }

    #[test]
    fn test_build_rejects_empty_param_value() {
        let err = PipelineBuilder::new("p")
            .step(step("a").param("bucket", "  "))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyParam {
                step: "a".to_string(),
                param: "bucket".to_string()
            }
        );
    }

    #[test]
    fn test_execution_order_of_chain_is_declaration_order() {
        let pipeline = PipelineBuilder::new("p")
            .step(step("a"))
            .step(step("b").after("a"))
            .step(step("c").after("b"))
            .build()
            .unwrap();
        assert_eq!(pipeline.execution_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_execution_order_respects_upstream_over_declaration() {
        // "late" is declared first but depends on "early".
        let pipeline = PipelineBuilder::new("p")
            .step(step("late").after("early"))
            .step(step("early"))
            .build()
            .unwrap();
        assert_eq!(pipeline.execution_order().unwrap(), vec!["early", "late"]);
    }
}
