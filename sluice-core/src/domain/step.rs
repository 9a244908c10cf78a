//! Step domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// Capability a step invokes when the orchestrator runs it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// Upload a local file to object storage
    FileUpload,
    /// Create a warehouse dataset (idempotent on the warehouse side)
    DatasetCreate,
    /// Bulk-load stored objects into a warehouse table
    BulkLoad,
    /// Compile and run a filtered group of transformation models
    TransformRun,
}

impl StepKind {
    /// Wire name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileUpload => "FILE_UPLOAD",
            Self::DatasetCreate => "DATASET_CREATE",
            Self::BulkLoad => "BULK_LOAD",
            Self::TransformRun => "TRANSFORM_RUN",
        }
    }
}

/// Policy for a destination table that already has rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteDisposition {
    /// Truncate the table and replace its rows
    #[serde(rename = "WRITE_TRUNCATE")]
    WriteTruncate,
    /// Append the loaded rows to existing ones
    #[serde(rename = "WRITE_APPEND")]
    WriteAppend,
    /// Fail the load if the table is not empty
    #[serde(rename = "WRITE_EMPTY")]
    WriteEmpty,
}

impl WriteDisposition {
    /// Wire string understood by the warehouse load service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WriteTruncate => "WRITE_TRUNCATE",
            Self::WriteAppend => "WRITE_APPEND",
            Self::WriteEmpty => "WRITE_EMPTY",
        }
    }
}

impl FromStr for WriteDisposition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WRITE_TRUNCATE" => Ok(Self::WriteTruncate),
            "WRITE_APPEND" => Ok(Self::WriteAppend),
            "WRITE_EMPTY" => Ok(Self::WriteEmpty),
            other => Err(ConfigError::InvalidEnum {
                field: "write_disposition",
                value: other.to_string(),
                allowed: "WRITE_TRUNCATE, WRITE_APPEND, WRITE_EMPTY",
            }),
        }
    }
}

/// Format of the source objects handed to the bulk-load service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "NEWLINE_DELIMITED_JSON")]
    Json,
    #[serde(rename = "PARQUET")]
    Parquet,
    #[serde(rename = "AVRO")]
    Avro,
}

impl SourceFormat {
    /// Wire string understood by the warehouse load service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "NEWLINE_DELIMITED_JSON",
            Self::Parquet => "PARQUET",
            Self::Avro => "AVRO",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CSV" => Ok(Self::Csv),
            "NEWLINE_DELIMITED_JSON" => Ok(Self::Json),
            "PARQUET" => Ok(Self::Parquet),
            "AVRO" => Ok(Self::Avro),
            other => Err(ConfigError::InvalidEnum {
                field: "source_format",
                value: other.to_string(),
                allowed: "CSV, NEWLINE_DELIMITED_JSON, PARQUET, AVRO",
            }),
        }
    }
}

/// One named unit of work within a pipeline
///
/// A step names a capability kind and carries a flat map of literal
/// parameters. Parameters are fully static at definition time; nothing is
/// computed while the descriptor is built. `upstream` lists the steps that
/// must complete before this one may start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub kind: StepKind,
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub upstream: Vec<String>,
}

impl Step {
    /// Create a step with no parameters and no upstream dependencies
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
            params: BTreeMap::new(),
            upstream: Vec::new(),
        }
    }

    /// Add a literal parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Declare a step that must complete before this one
    pub fn after(mut self, upstream: impl Into<String>) -> Self {
        self.upstream.push(upstream.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_disposition_parses_wire_strings() {
        assert_eq!(
            "WRITE_TRUNCATE".parse::<WriteDisposition>().unwrap(),
            WriteDisposition::WriteTruncate
        );
        assert_eq!(
            "WRITE_APPEND".parse::<WriteDisposition>().unwrap(),
            WriteDisposition::WriteAppend
        );
    }

    #[test]
    fn test_write_disposition_rejects_unknown_value() {
        let err = "DELETE_EVERYTHING".parse::<WriteDisposition>().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnum {
                field: "write_disposition",
                ..
            }
        ));
    }

    #[test]
    fn test_source_format_round_trip() {
        for format in [
            SourceFormat::Csv,
            SourceFormat::Json,
            SourceFormat::Parquet,
            SourceFormat::Avro,
        ] {
            assert_eq!(format.as_str().parse::<SourceFormat>().unwrap(), format);
        }
        assert!("XML".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn test_step_kind_wire_names() {
        let json = serde_json::to_string(&StepKind::FileUpload).unwrap();
        assert_eq!(json, "\"FILE_UPLOAD\"");
        let kind: StepKind = serde_json::from_str("\"BULK_LOAD\"").unwrap();
        assert_eq!(kind, StepKind::BulkLoad);
    }

    #[test]
    fn test_step_builder_helpers() {
        let step = Step::new("load", StepKind::BulkLoad)
            .param("bucket", "b")
            .after("create");
        assert_eq!(step.params.get("bucket").map(String::as_str), Some("b"));
        assert_eq!(step.upstream, vec!["create".to_string()]);
    }
}
