//! Pipeline command handlers
//!
//! Handles rendering the built-in retail descriptor, validating and planning
//! descriptor files, and registering descriptors with the orchestrator.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use sluice_core::domain::pipeline::Pipeline;
use sluice_core::dto::pipeline::{RegisterPipeline, RegisteredPipeline};
use sluice_core::retail::{self, RetailParams};

use crate::config::Config;
use crate::id_resolver::resolve_pipeline_id;
use crate::types::IdOrPrefix;
use sluice_client::OrchestratorClient;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Build the retail descriptor and print it as JSON
    Render {
        /// JSON file overriding the default retail parameters
        #[arg(short, long)]
        params: Option<String>,

        /// Inline parameter overrides as key=value pairs (e.g., bucket=my-bucket)
        #[arg(short, long, value_parser = parse_key_val)]
        set: Vec<(String, String)>,

        /// Write the descriptor to this file instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Parse and validate a descriptor file
    Validate {
        /// Path to a descriptor JSON file
        #[arg(short, long)]
        file: String,
    },
    /// Show the execution order of a descriptor file
    Plan {
        /// Path to a descriptor JSON file
        #[arg(short, long)]
        file: String,
    },
    /// Register a descriptor with the orchestrator
    Register {
        /// Path to a descriptor JSON file; omitted means the built-in retail descriptor
        #[arg(short, long)]
        file: Option<String>,

        /// JSON file overriding the default retail parameters (ignored with --file)
        #[arg(short, long)]
        params: Option<String>,

        /// Inline parameter overrides as key=value pairs (ignored with --file)
        #[arg(short, long, value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },
    /// List registered pipelines
    List,
    /// Get registered pipeline details
    Get {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Delete a registered pipeline
    Delete {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
}

/// Handle pipeline commands
///
/// Routes pipeline subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The pipeline command to execute
/// * `config` - The CLI configuration
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::Render { params, set, out } => {
            render_pipeline(params.as_deref(), &set, out)
        }
        PipelineCommands::Validate { file } => validate_pipeline(&file),
        PipelineCommands::Plan { file } => plan_pipeline(&file),
        PipelineCommands::Register { file, params, set } => {
            let client = OrchestratorClient::new(&config.orchestrator_url);
            register_pipeline(&client, file.as_deref(), params.as_deref(), &set).await
        }
        PipelineCommands::List => {
            let client = OrchestratorClient::new(&config.orchestrator_url);
            list_pipelines(&client).await
        }
        PipelineCommands::Get { id } => {
            let client = OrchestratorClient::new(&config.orchestrator_url);
            get_pipeline(&client, &id).await
        }
        PipelineCommands::Delete { id } => {
            let client = OrchestratorClient::new(&config.orchestrator_url);
            delete_pipeline(&client, &id).await
        }
    }
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Load retail parameters: defaults, then the JSON file, then inline overrides
fn load_params(path: Option<&str>, overrides: &[(String, String)]) -> Result<RetailParams> {
    let mut params = match path {
        None => RetailParams::default(),
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read params file: {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse params file: {}", path))?
        }
    };

    for (key, value) in overrides {
        apply_override(&mut params, key, value)
            .with_context(|| format!("invalid override '{}={}'", key, value))?;
    }

    Ok(params)
}

/// Apply one key=value override to the retail parameters
///
/// Enumerated fields go through their wire-string parsers, so an invalid
/// write disposition or source format is rejected here rather than at build.
fn apply_override(params: &mut RetailParams, key: &str, value: &str) -> Result<()> {
    match key {
        "source_path" => params.source_path = value.to_string(),
        "destination_object" => params.destination_object = value.to_string(),
        "bucket" => params.bucket = value.to_string(),
        "mime_type" => params.mime_type = value.to_string(),
        "gcp_conn_id" => params.gcp_conn_id = value.to_string(),
        "project_id" => params.project_id = value.to_string(),
        "dataset_id" => params.dataset_id = value.to_string(),
        "table" => params.table = value.to_string(),
        "source_format" => params.source_format = value.parse()?,
        "write_disposition" => params.write_disposition = value.parse()?,
        "dbt_project_dir" => params.dbt_project_dir = value.to_string(),
        "dbt_conn_id" => params.dbt_conn_id = value.to_string(),
        "transform_select" => params.transform_select = value.to_string(),
        "report_select" => params.report_select = value.to_string(),
        other => bail!("unknown retail parameter '{}'", other),
    }
    Ok(())
}

/// Load and re-validate a descriptor file
fn load_descriptor(path: &str) -> Result<Pipeline> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor file: {}", path))?;
    Pipeline::from_json(&content)
        .with_context(|| format!("Invalid pipeline descriptor: {}", path))
}

/// Build the retail descriptor and print or write it
fn render_pipeline(
    params_path: Option<&str>,
    overrides: &[(String, String)],
    out: Option<String>,
) -> Result<()> {
    let params = load_params(params_path, overrides)?;
    let pipeline = retail::build(&params).context("Failed to build retail descriptor")?;
    let json = pipeline.to_json()?;

    match out {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write descriptor to {}", path))?;
            println!(
                "{}",
                format!("✓ Descriptor written to {}", path).green().bold()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Validate a descriptor file
fn validate_pipeline(path: &str) -> Result<()> {
    let pipeline = load_descriptor(path)?;

    println!("{}", "✓ Descriptor is valid".green().bold());
    println!("  Name:  {}", pipeline.name.bold());
    println!("  Steps: {}", pipeline.steps.len());

    Ok(())
}

/// Print the execution order of a descriptor file
fn plan_pipeline(path: &str) -> Result<()> {
    let pipeline = load_descriptor(path)?;
    let order = pipeline
        .execution_order()
        .context("Descriptor has no valid execution order")?;

    println!("{}", format!("Plan for '{}':", pipeline.name).bold());
    for (i, name) in order.iter().enumerate() {
        let Some(step) = pipeline.step(name) else {
            continue;
        };
        let upstream = if step.upstream.is_empty() {
            "-".to_string()
        } else {
            step.upstream.join(", ")
        };
        println!(
            "  {}. {} {} {}",
            i + 1,
            name.cyan(),
            format!("[{}]", step.kind.as_str()).dimmed(),
            format!("after: {}", upstream).dimmed()
        );
    }

    Ok(())
}

/// Register a descriptor with the orchestrator
async fn register_pipeline(
    client: &OrchestratorClient,
    file: Option<&str>,
    params_path: Option<&str>,
    overrides: &[(String, String)],
) -> Result<()> {
    let pipeline = match file {
        Some(path) => load_descriptor(path)?,
        None => {
            let params = load_params(params_path, overrides)?;
            retail::build(&params).context("Failed to build retail descriptor")?
        }
    };

    let step_names: Vec<String> = pipeline.steps.iter().map(|s| s.name.clone()).collect();
    let registered = client
        .register_pipeline(RegisterPipeline { pipeline })
        .await?;

    println!("{}", "✓ Pipeline registered successfully!".green().bold());
    println!("  ID:    {}", registered.id.to_string().cyan());
    println!("  Name:  {}", registered.name.bold());
    println!("  Steps: {}", step_names.join(" → ").dimmed());

    Ok(())
}

/// List all registered pipelines
async fn list_pipelines(client: &OrchestratorClient) -> Result<()> {
    let pipelines = client.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} pipeline(s):", pipelines.len()).bold()
        );
        println!();
        for pipeline in pipelines {
            print_pipeline_summary(&pipeline);
        }
    }

    Ok(())
}

/// Get and display a single registered pipeline
async fn get_pipeline(client: &OrchestratorClient, id: &str) -> Result<()> {
    let id_or_prefix = IdOrPrefix::parse(id);
    let uuid = resolve_pipeline_id(client, &id_or_prefix).await?;

    let pipeline = client.get_pipeline(uuid).await?;

    print_pipeline_summary(&pipeline);

    Ok(())
}

/// Delete a registered pipeline
async fn delete_pipeline(client: &OrchestratorClient, id: &str) -> Result<()> {
    let id_or_prefix = IdOrPrefix::parse(id);
    let uuid = resolve_pipeline_id(client, &id_or_prefix).await?;

    client.delete_pipeline(uuid).await?;

    println!(
        "{}",
        format!("✓ Pipeline {} deleted successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

/// Print one line per registered pipeline
fn print_pipeline_summary(pipeline: &RegisteredPipeline) {
    let tags = if pipeline.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", pipeline.tags.join(", "))
    };
    println!(
        "  {} {}{} {}",
        pipeline.id.to_string().cyan(),
        pipeline.name.bold(),
        tags.dimmed(),
        format!("registered {}", pipeline.registered_at.format("%Y-%m-%d %H:%M")).dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::domain::step::{SourceFormat, WriteDisposition};

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("bucket=my-bucket").unwrap(),
            ("bucket".to_string(), "my-bucket".to_string())
        );
        // Only the first '=' splits; the value may contain more.
        assert_eq!(
            parse_key_val("transform_select=path:a=b").unwrap(),
            ("transform_select".to_string(), "path:a=b".to_string())
        );
        assert!(parse_key_val("no-equals-sign").is_err());
    }

    #[test]
    fn test_apply_override_sets_fields_and_enums() {
        let mut params = RetailParams::default();
        apply_override(&mut params, "bucket", "other-bucket").unwrap();
        apply_override(&mut params, "write_disposition", "WRITE_APPEND").unwrap();
        apply_override(&mut params, "source_format", "PARQUET").unwrap();
        assert_eq!(params.bucket, "other-bucket");
        assert_eq!(params.write_disposition, WriteDisposition::WriteAppend);
        assert_eq!(params.source_format, SourceFormat::Parquet);
    }

    #[test]
    fn test_apply_override_rejects_bad_input() {
        let mut params = RetailParams::default();
        assert!(apply_override(&mut params, "write_disposition", "DELETE_EVERYTHING").is_err());
        assert!(apply_override(&mut params, "no_such_field", "x").is_err());
        // Failed overrides leave the defaults untouched.
        assert_eq!(params, RetailParams::default());
    }

    #[test]
    fn test_load_params_applies_overrides_over_defaults() {
        let overrides = vec![("dataset_id".to_string(), "retail_dev".to_string())];
        let params = load_params(None, &overrides).unwrap();
        assert_eq!(params.dataset_id, "retail_dev");
        assert_eq!(params.bucket, RetailParams::default().bucket);
    }
}
