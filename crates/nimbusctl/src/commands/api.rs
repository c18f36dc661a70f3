//! Raw API access for direct REST endpoint calls
//!
//! Escape hatch for endpoints without a dedicated subcommand. The path is
//! passed through as-is after slash normalization, so new API surface is
//! reachable without a CLI release.

use crate::cli::{Cli, HttpMethod};
use crate::commands::utils::read_file_input;
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;
use anyhow::Context;
use serde_json::Value;

pub async fn handle_api_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    method: HttpMethod,
    path: &str,
    data: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;

    // Ensure path starts with /
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    // Parse request body if provided, inline or from @file
    let body: Option<Value> = match data {
        Some(data_str) => {
            let content = read_file_input(data_str)?;
            let parsed = serde_json::from_str(&content).with_context(|| {
                if let Some(file_path) = data_str.strip_prefix('@') {
                    format!("Failed to parse JSON from file: {}", file_path)
                } else {
                    "Failed to parse JSON from data parameter".to_string()
                }
            })?;
            Some(parsed)
        }
        None => None,
    };

    let response = match method {
        HttpMethod::Get => client.get_raw(&normalized_path).await?,
        HttpMethod::Post => {
            let body = body.unwrap_or_else(|| serde_json::json!({}));
            client.post_raw(&normalized_path, &body).await?
        }
        HttpMethod::Delete => client.delete_raw(&normalized_path).await?,
    };

    // Raw responses default to JSON; tables only when asked for explicitly
    let format = match cli.output {
        crate::cli::OutputFormat::Auto | crate::cli::OutputFormat::Json => {
            crate::output::OutputFormat::Json
        }
        crate::cli::OutputFormat::Yaml => crate::output::OutputFormat::Yaml,
        crate::cli::OutputFormat::Table => crate::output::OutputFormat::Table,
    };

    print_output(response, format, cli.query.as_deref())?;
    Ok(())
}
