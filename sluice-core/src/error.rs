//! Descriptor build-time errors

use thiserror::Error;

/// Result type alias for descriptor construction
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building or validating a pipeline descriptor
///
/// These are the only errors this crate produces, and they are fatal: a
/// descriptor that fails validation cannot be registered. Anything that goes
/// wrong while a step actually runs (network failure, permission denial,
/// malformed source data, transform-model failure) is raised by the external
/// collaborator and handled by the orchestrator's retry and alerting policy;
/// the descriptor never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required string field is missing or empty
    #[error("required field '{field}' is empty")]
    EmptyField { field: String },

    /// A step parameter has an empty literal value
    #[error("step '{step}' has empty value for parameter '{param}'")]
    EmptyParam { step: String, param: String },

    /// Two steps share a name
    #[error("duplicate step name '{name}'")]
    DuplicateStep { name: String },

    /// A step's upstream reference does not name any step in the pipeline
    #[error("step '{step}' references unknown upstream step '{upstream}'")]
    UnknownUpstream { step: String, upstream: String },

    /// A step lists itself as upstream
    #[error("step '{step}' depends on itself")]
    SelfReference { step: String },

    /// The upstream relation contains a cycle
    #[error("dependency cycle involving step '{step}'")]
    DependencyCycle { step: String },

    /// A serialized descriptor could not be parsed
    #[error("malformed descriptor: {0}")]
    Malformed(String),

    /// A value is not a member of its fixed enumeration
    #[error("invalid value '{value}' for {field} (allowed: {allowed})")]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
}
