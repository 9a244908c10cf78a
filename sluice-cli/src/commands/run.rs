//! Run command handlers
//!
//! Read-only views of orchestrator-owned run state. A failed run halts at
//! its failing step and blocks everything downstream; the orchestrator's own
//! retry and alerting policy decides what happens next.

use anyhow::{Result, anyhow};
use clap::Subcommand;
use colored::*;
use sluice_core::dto::run::{RunDto, RunStatus};

use crate::config::Config;
use crate::id_resolver::{resolve_pipeline_id, resolve_run_id};
use crate::types::IdOrPrefix;
use sluice_client::OrchestratorClient;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// List runs of a pipeline
    List {
        /// Pipeline ID or unambiguous prefix
        pipeline: String,
    },
    /// Get run details
    Get {
        /// Run ID or unambiguous prefix
        id: String,

        /// Pipeline ID or prefix, needed only to resolve a run prefix
        #[arg(short, long)]
        pipeline: Option<String>,
    },
}

/// Handle run commands
///
/// # Arguments
/// * `command` - The run command to execute
/// * `config` - The CLI configuration
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        RunCommands::List { pipeline } => list_runs(&client, &pipeline).await,
        RunCommands::Get { id, pipeline } => get_run(&client, &id, pipeline.as_deref()).await,
    }
}

/// List runs of a pipeline
async fn list_runs(client: &OrchestratorClient, pipeline: &str) -> Result<()> {
    let pipeline_id =
        resolve_pipeline_id(client, &IdOrPrefix::parse(pipeline)).await?;
    let runs = client.list_runs(pipeline_id).await?;

    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!("{}", format!("Found {} run(s):", runs.len()).bold());
        println!();
        for run in runs {
            print_run_summary(&run);
        }
    }

    Ok(())
}

/// Get and display a single run
///
/// A full run UUID is fetched directly; a prefix needs `--pipeline` to scope
/// the resolution.
async fn get_run(client: &OrchestratorClient, id: &str, pipeline: Option<&str>) -> Result<()> {
    let id_or_prefix = IdOrPrefix::parse(id);
    let run_id = match id_or_prefix.as_uuid() {
        Some(uuid) => uuid,
        None => {
            let pipeline = pipeline
                .ok_or_else(|| anyhow!("--pipeline is required to resolve a run prefix"))?;
            let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(pipeline)).await?;
            resolve_run_id(client, pipeline_id, &id_or_prefix).await?
        }
    };

    let run = client.get_run(run_id).await?;

    print_run_summary(&run);
    if let Some(started) = run.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(completed) = run.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}

/// Print one line per run
fn print_run_summary(run: &RunDto) {
    let failed_at = run
        .failed_step
        .as_ref()
        .map(|s| format!(" at step '{}'", s))
        .unwrap_or_default();
    println!(
        "  {} {}{}",
        run.id.to_string().cyan(),
        format_status(run.status),
        failed_at.red()
    );
}

/// Colorize a run status for display
fn format_status(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Queued => "queued".yellow(),
        RunStatus::Running => "running".cyan(),
        RunStatus::Succeeded => "succeeded".green(),
        RunStatus::Failed => "failed".red().bold(),
        RunStatus::Cancelled => "cancelled".dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run_uuid_needs_no_pipeline_scope() {
        // `run get <uuid>` fetches directly; only a prefix needs --pipeline.
        let id = IdOrPrefix::parse("0b718887-2bbd-4f2f-9c55-5c5e24a2f1c5");
        assert!(id.as_uuid().is_some());

        let prefix = IdOrPrefix::parse("0b7188");
        assert!(prefix.as_uuid().is_none());
    }
}
