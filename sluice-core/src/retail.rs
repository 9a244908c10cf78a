//! The retail ingest pipeline
//!
//! The one pipeline this project ships: upload the online-retail CSV to
//! object storage, provision the warehouse dataset, bulk-load the raw
//! invoices table, then run the "transform" and "report" dbt groups, in a
//! strict chain. Every literal lives in [`RetailParams`], an explicit
//! immutable value passed into [`build`]; there is no shared defaults object
//! between pipeline definitions.

use serde::{Deserialize, Serialize};

use crate::builder::PipelineBuilder;
use crate::domain::pipeline::{Pipeline, Schedule};
use crate::domain::step::{SourceFormat, Step, StepKind, WriteDisposition};
use crate::error::{ConfigError, Result};

/// Step names, in execution order
pub const STEP_UPLOAD: &str = "upload_csv_to_gcs";
pub const STEP_CREATE_DATASET: &str = "create_retail_dataset";
pub const STEP_BULK_LOAD: &str = "gcs_to_bigquery";
pub const STEP_TRANSFORM: &str = "transform";
pub const STEP_REPORT: &str = "report";

/// Fixed literals for the retail pipeline
///
/// All values are static configuration; credential ids are opaque references
/// resolved by the orchestrator at execution time, never secrets. A JSON
/// params file may override any subset of fields, the rest keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetailParams {
    /// Local path of the CSV to upload
    pub source_path: String,
    /// Object key inside the bucket
    pub destination_object: String,
    /// Destination storage bucket
    pub bucket: String,
    /// Content type sent with the upload
    pub mime_type: String,
    /// Credential reference for storage and warehouse steps
    pub gcp_conn_id: String,
    /// Warehouse project id
    pub project_id: String,
    /// Warehouse dataset id
    pub dataset_id: String,
    /// Destination table inside the dataset
    pub table: String,
    pub source_format: SourceFormat,
    pub write_disposition: WriteDisposition,
    /// Root of the dbt project the transform runner compiles
    pub dbt_project_dir: String,
    /// Connection-profile reference for the transform runner
    pub dbt_conn_id: String,
    /// Model-selection filter for the "transform" group
    pub transform_select: String,
    /// Model-selection filter for the "report" group
    pub report_select: String,
}

impl Default for RetailParams {
    fn default() -> Self {
        Self {
            source_path: "include/dataset/online_retail.csv".to_string(),
            destination_object: "raw/online_retail.csv".to_string(),
            bucket: "retail-gcp-2024-01".to_string(),
            mime_type: "text/csv".to_string(),
            gcp_conn_id: "gcp".to_string(),
            project_id: "onlineretail-413310".to_string(),
            dataset_id: "retail".to_string(),
            table: "raw_invoices".to_string(),
            source_format: SourceFormat::Csv,
            write_disposition: WriteDisposition::WriteTruncate,
            dbt_project_dir: "include/dbt".to_string(),
            dbt_conn_id: "gcp".to_string(),
            transform_select: "path:models/transform".to_string(),
            report_select: "path:models/report".to_string(),
        }
    }
}

impl RetailParams {
    /// Destination in `project:dataset.table` form, as the bulk-load service
    /// expects it
    pub fn destination_table(&self) -> String {
        format!("{}:{}.{}", self.project_id, self.dataset_id, self.table)
    }

    fn check_non_empty(&self) -> Result<()> {
        let fields = [
            ("source_path", &self.source_path),
            ("destination_object", &self.destination_object),
            ("bucket", &self.bucket),
            ("mime_type", &self.mime_type),
            ("gcp_conn_id", &self.gcp_conn_id),
            ("project_id", &self.project_id),
            ("dataset_id", &self.dataset_id),
            ("table", &self.table),
            ("dbt_project_dir", &self.dbt_project_dir),
            ("dbt_conn_id", &self.dbt_conn_id),
            ("transform_select", &self.transform_select),
            ("report_select", &self.report_select),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Build the retail pipeline descriptor
///
/// Wires exactly five steps in a strict total order, each depending only on
/// its immediate predecessor:
/// upload → create-dataset → bulk-load → transform → report.
///
/// # Errors
/// Returns [`ConfigError`] when any literal is empty. Nothing is contacted at
/// build time; the orchestrator performs all I/O when it executes the steps.
pub fn build(params: &RetailParams) -> Result<Pipeline> {
    params.check_non_empty()?;

    let upload = Step::new(STEP_UPLOAD, StepKind::FileUpload)
        .param("src", &params.source_path)
        .param("dst", &params.destination_object)
        .param("bucket", &params.bucket)
        .param("mime_type", &params.mime_type)
        .param("gcp_conn_id", &params.gcp_conn_id);

    let create_dataset = Step::new(STEP_CREATE_DATASET, StepKind::DatasetCreate)
        .param("project_id", &params.project_id)
        .param("dataset_id", &params.dataset_id)
        .param("gcp_conn_id", &params.gcp_conn_id)
        .after(STEP_UPLOAD);

    let bulk_load = Step::new(STEP_BULK_LOAD, StepKind::BulkLoad)
        .param("bucket", &params.bucket)
        .param("source_objects", &params.destination_object)
        .param(
            "destination_project_dataset_table",
            params.destination_table(),
        )
        .param("source_format", params.source_format.as_str())
        .param("write_disposition", params.write_disposition.as_str())
        .param("gcp_conn_id", &params.gcp_conn_id)
        .after(STEP_CREATE_DATASET);

    let transform = Step::new(STEP_TRANSFORM, StepKind::TransformRun)
        .param("project_dir", &params.dbt_project_dir)
        .param("conn_id", &params.dbt_conn_id)
        .param("select", &params.transform_select)
        .after(STEP_BULK_LOAD);

    let report = Step::new(STEP_REPORT, StepKind::TransformRun)
        .param("project_dir", &params.dbt_project_dir)
        .param("conn_id", &params.dbt_conn_id)
        .param("select", &params.report_select)
        .after(STEP_TRANSFORM);

    PipelineBuilder::new("retail")
        .tag("retail")
        .schedule(Schedule::default())
        .step(upload)
        .step(create_dataset)
        .step(bulk_load)
        .step(transform)
        .step(report)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_yields_five_steps_in_fixed_order() {
        let pipeline = build(&RetailParams::default()).unwrap();
        let names: Vec<&str> = pipeline.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                STEP_UPLOAD,
                STEP_CREATE_DATASET,
                STEP_BULK_LOAD,
                STEP_TRANSFORM,
                STEP_REPORT
            ]
        );
        assert_eq!(pipeline.execution_order().unwrap(), names);

        // Each step depends only on its immediate predecessor.
        assert!(pipeline.step(STEP_UPLOAD).unwrap().upstream.is_empty());
        for pair in names.windows(2) {
            assert_eq!(
                pipeline.step(pair[1]).unwrap().upstream,
                vec![pair[0].to_string()]
            );
        }
    }

    #[test]
    fn test_empty_bucket_fails_with_no_partial_pipeline() {
        let params = RetailParams {
            bucket: String::new(),
            ..RetailParams::default()
        };
        let err = build(&params).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyField {
                field: "bucket".to_string()
            }
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let params = RetailParams::default();
        assert_eq!(build(&params).unwrap(), build(&params).unwrap());
    }

    #[test]
    fn test_upload_step_echoes_literals() {
        let pipeline = build(&RetailParams::default()).unwrap();
        let upload = pipeline.step(STEP_UPLOAD).unwrap();
        assert_eq!(upload.kind, StepKind::FileUpload);
        assert_eq!(
            upload.params.get("src").map(String::as_str),
            Some("include/dataset/online_retail.csv")
        );
        assert_eq!(
            upload.params.get("bucket").map(String::as_str),
            Some("retail-gcp-2024-01")
        );
        assert_eq!(
            upload.params.get("dst").map(String::as_str),
            Some("raw/online_retail.csv")
        );
    }

    #[test]
    fn test_bulk_load_destination_and_transitive_upstream() {
        let pipeline = build(&RetailParams::default()).unwrap();
        let load = pipeline.step(STEP_BULK_LOAD).unwrap();
        assert_eq!(load.kind, StepKind::BulkLoad);
        assert_eq!(
            load.params
                .get("destination_project_dataset_table")
                .map(String::as_str),
            Some("onlineretail-413310:retail.raw_invoices")
        );
        assert_eq!(
            load.params.get("source_format").map(String::as_str),
            Some("CSV")
        );
        assert_eq!(
            load.params.get("write_disposition").map(String::as_str),
            Some("WRITE_TRUNCATE")
        );
        // Depends on the dataset step; the upload step is only transitive.
        assert_eq!(load.upstream, vec![STEP_CREATE_DATASET.to_string()]);
    }

    #[test]
    fn test_descriptor_json_round_trip() {
        let pipeline = build(&RetailParams::default()).unwrap();
        let json = pipeline.to_json().unwrap();
        assert_eq!(Pipeline::from_json(&json).unwrap(), pipeline);
    }

    #[test]
    fn test_params_file_overrides_subset() {
        let params: RetailParams =
            serde_json::from_str(r#"{ "bucket": "other-bucket", "write_disposition": "WRITE_APPEND" }"#)
                .unwrap();
        assert_eq!(params.bucket, "other-bucket");
        assert_eq!(params.write_disposition, WriteDisposition::WriteAppend);
        assert_eq!(params.source_path, RetailParams::default().source_path);
    }

    #[test]
    fn test_params_reject_unknown_write_disposition() {
        let err = serde_json::from_str::<RetailParams>(
            r#"{ "write_disposition": "DELETE_EVERYTHING" }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("DELETE_EVERYTHING") || err.is_data());
    }
}
