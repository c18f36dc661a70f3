//! Shared utilities for handling asynchronous operations
//!
//! Waiting itself lives in the Layer 2 workflows and `wait_for_tasks`; this
//! module carries the common --wait flag surface, spinner plumbing, and the
//! reporting of task envelopes when the caller does not wait.

use std::collections::BTreeMap;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nimbus_cloud::tasks::{Task, TaskResults};
use nimbus_cloud::types::MetadataValue;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::{NimbusCtlError, Result as CliResult};
use crate::output::print_output;

/// Helper to print non-table output
fn print_json_or_yaml(data: Value, output_format: OutputFormat) -> CliResult<()> {
    match output_format {
        OutputFormat::Json => print_output(data, crate::output::OutputFormat::Json, None)?,
        OutputFormat::Yaml => print_output(data, crate::output::OutputFormat::Yaml, None)?,
        OutputFormat::Auto | OutputFormat::Table => {
            print_output(data, crate::output::OutputFormat::Json, None)?
        }
    }
    Ok(())
}

/// Common CLI arguments for async operations
#[derive(Args, Debug, Clone)]
pub struct AsyncOperationArgs {
    /// Wait for operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds
    #[arg(long, default_value = "300", requires = "wait")]
    pub wait_timeout: u64,

    /// Polling interval in seconds
    #[arg(long, default_value = "5", requires = "wait")]
    pub wait_interval: u64,
}

/// Parse repeated key=value metadata flags into a metadata map
///
/// Malformed entries are rejected here, before any request is made.
pub fn parse_metadata(entries: &[String]) -> CliResult<Option<BTreeMap<String, MetadataValue>>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let mut metadata = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| NimbusCtlError::InvalidInput {
                message: format!("invalid metadata format: '{}' (expected key=value)", entry),
            })?;
        metadata.insert(key.to_string(), MetadataValue::from(value));
    }
    Ok(Some(metadata))
}

/// Spinner used while waiting on tasks
pub fn task_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.set_message(message);
    pb
}

/// Progress callback that drives a spinner from task polling events
pub fn spinner_callback(pb: &ProgressBar) -> nimbusctl_core::ProgressCallback {
    let pb = pb.clone();
    Box::new(move |event: nimbusctl_core::ProgressEvent| match &event {
        nimbusctl_core::ProgressEvent::Started { task_id } => {
            pb.set_message(format!("Task {} started", task_id));
        }
        nimbusctl_core::ProgressEvent::Polling { task_id, state, .. } => {
            pb.set_message(format!(
                "Task {}: {}",
                task_id,
                format_task_state(&state.to_string())
            ));
        }
        nimbusctl_core::ProgressEvent::Completed { task_id, .. } => {
            pb.finish_with_message(format!(
                "Task {}: {}",
                task_id,
                format_task_state("FINISHED")
            ));
        }
        nimbusctl_core::ProgressEvent::Failed { task_id, error } => {
            pb.finish_with_message(format!("Task {} failed: {}", task_id, error));
        }
    })
}

/// Report a task envelope without waiting on it
///
/// Callers that wait go through the Layer 2 workflows instead; this path
/// tells the user which tasks were spawned and how to track them.
pub fn handle_async_response(
    results: &TaskResults,
    output_format: OutputFormat,
    query: Option<&str>,
    success_message: &str,
) -> CliResult<()> {
    // Apply JMESPath query if provided
    let response = serde_json::to_value(results)?;
    let result = if let Some(q) = query {
        crate::commands::utils::apply_jmespath(&response, q)?
    } else {
        response
    };

    match output_format {
        OutputFormat::Auto | OutputFormat::Table => {
            println!("{}", success_message);
            if !results.tasks.is_empty() {
                println!("Task IDs: {}", results.tasks.join(", "));
                println!(
                    "To wait for completion, run: nimbusctl task wait {}",
                    results.tasks.join(" ")
                );
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => print_json_or_yaml(result, output_format)?,
    }

    Ok(())
}

/// Format task state for display with status icons
fn format_task_state(state: &str) -> String {
    match state.to_lowercase().as_str() {
        "finished" => format!("\u{2713} {}", state), // checkmark
        "error" => format!("\u{2717} {}", state),    // x mark
        "new" | "running" => format!("\u{21bb} {}", state), // arrow circle
        _ => state.to_string(),
    }
}

/// Print detailed task information
pub fn print_task_details(task: &Task) -> CliResult<()> {
    println!("\nTask Details:");
    println!("-------------");

    println!("ID: {}", task.id);
    println!("State: {}", format_task_state(&task.state.to_string()));

    if let Some(task_type) = &task.task_type {
        println!("Type: {}", task_type);
    }

    if let Some(created) = &task.created_on {
        println!("Created: {}", created);
    }

    if let Some(updated) = &task.updated_on {
        println!("Updated: {}", updated);
    }

    if let Some(error) = &task.error {
        println!("Error: {}", error);
    }

    if let Some(resources) = &task.created_resources {
        if !resources.images.is_empty() {
            println!("Created images: {}", resources.images.join(", "));
        }
        if !resources.floating_ips.is_empty() {
            println!("Created floating IPs: {}", resources.floating_ips.join(", "));
        }
        for (family, ids) in &resources.other {
            println!("Created {}: {}", family, ids.join(", "));
        }
    }

    Ok(())
}
