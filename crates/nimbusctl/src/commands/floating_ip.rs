//! Floating IP command implementations
//!
//! Create and delete are asynchronous and support --wait through the Layer 2
//! workflows. Assign and unassign answer immediately with the updated
//! floating IP, so they have no wait path.

use crate::cli::{Cli, FloatingIpCommands, OutputFormat};
use crate::commands::async_utils::{
    AsyncOperationArgs, handle_async_response, spinner_callback, task_spinner,
};
use crate::commands::utils::{confirm_action, format_status_text};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;
use nimbus_cloud::{FloatingIp, FloatingIpCreateRequest, FloatingIpHandler};
use nimbusctl_core::{create_floating_ip_and_wait, delete_floating_ip_and_wait};
use serde_json::{Value, json};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

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

pub async fn handle_floating_ip_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    cmd: &FloatingIpCommands,
) -> CliResult<()> {
    match cmd {
        FloatingIpCommands::List => list_floating_ips(cli, conn_mgr).await,
        FloatingIpCommands::Get { id } => get_floating_ip(cli, conn_mgr, id).await,
        FloatingIpCommands::Create {
            port_id,
            fixed_ip,
            async_ops,
        } => create_floating_ip(cli, conn_mgr, port_id, *fixed_ip, async_ops).await,
        FloatingIpCommands::Delete {
            id,
            force,
            async_ops,
        } => delete_floating_ip(cli, conn_mgr, id, *force, async_ops).await,
        FloatingIpCommands::Assign {
            id,
            port_id,
            fixed_ip,
        } => assign_floating_ip(cli, conn_mgr, id, port_id, *fixed_ip).await,
        FloatingIpCommands::Unassign { id } => unassign_floating_ip(cli, conn_mgr, id).await,
    }
}

async fn list_floating_ips(cli: &Cli, conn_mgr: &ConnectionManager) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = FloatingIpHandler::new(client);

    let fips = handler.list_all().await?;
    debug!("Found {} floating IPs", fips.len());

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => {
            if fips.is_empty() {
                println!("No floating IPs found");
                return Ok(());
            }

            let rows: Vec<Value> = fips
                .iter()
                .map(|fip| {
                    json!({
                        "id": fip.id,
                        "address": display_ip(fip.floating_ip_address),
                        "fixed_ip": display_ip(fip.fixed_ip_address),
                        "port_id": fip.port_id.as_deref().unwrap_or("-"),
                        "status": fip.status.as_deref().unwrap_or("-"),
                    })
                })
                .collect();

            print_output(rows, crate::output::OutputFormat::Table, cli.query.as_deref())?;
        }
        OutputFormat::Json => {
            print_output(&fips, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&fips, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}

fn display_ip(ip: Option<IpAddr>) -> String {
    ip.map(|ip| ip.to_string()).unwrap_or_else(|| "-".to_string())
}

async fn get_floating_ip(cli: &Cli, conn_mgr: &ConnectionManager, id: &str) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = FloatingIpHandler::new(client);

    let fip = handler.get(id).await?;

    let format = match cli.output {
        OutputFormat::Auto | OutputFormat::Table => crate::output::OutputFormat::Table,
        OutputFormat::Json => crate::output::OutputFormat::Json,
        OutputFormat::Yaml => crate::output::OutputFormat::Yaml,
    };
    print_output(&fip, format, cli.query.as_deref())?;

    Ok(())
}

async fn create_floating_ip(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    port_id: &str,
    fixed_ip: IpAddr,
    async_ops: &AsyncOperationArgs,
) -> CliResult<()> {
    let request = FloatingIpCreateRequest::new(port_id, fixed_ip);
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;

    if async_ops.wait {
        // Layer 2 workflow: create, poll the task, fetch the provisioned IP
        let pb = task_spinner(format!("Creating floating IP on port {}...", port_id));
        let callback = spinner_callback(&pb);

        let result = create_floating_ip_and_wait(
            &client,
            &request,
            Duration::from_secs(async_ops.wait_timeout),
            Duration::from_secs(async_ops.wait_interval),
            Some(callback),
        )
        .await;
        pb.finish_and_clear();
        let fip = result?;

        match cli.output {
            OutputFormat::Auto | OutputFormat::Table => {
                println!("Floating IP created successfully");
                print_fip_details(&fip);
            }
            OutputFormat::Json => {
                print_output(&fip, crate::output::OutputFormat::Json, cli.query.as_deref())?;
            }
            OutputFormat::Yaml => {
                print_output(&fip, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
            }
        }
        Ok(())
    } else {
        let handler = FloatingIpHandler::new(client);
        let results = handler.create(&request).await?;

        handle_async_response(
            &results,
            cli.output,
            cli.query.as_deref(),
            "Floating IP creation started",
        )
    }
}

async fn delete_floating_ip(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    id: &str,
    force: bool,
    async_ops: &AsyncOperationArgs,
) -> CliResult<()> {
    if !force && !confirm_action(&format!("delete floating IP {}", id))? {
        println!("Operation cancelled");
        return Ok(());
    }

    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;

    if async_ops.wait {
        let pb = task_spinner(format!("Deleting floating IP {}...", id));
        let callback = spinner_callback(&pb);

        let result = delete_floating_ip_and_wait(
            &client,
            id,
            Duration::from_secs(async_ops.wait_timeout),
            Duration::from_secs(async_ops.wait_interval),
            Some(callback),
        )
        .await;
        pb.finish_and_clear();
        result?;

        match cli.output {
            OutputFormat::Auto | OutputFormat::Table => {
                println!("Floating IP {} deleted successfully", id);
            }
            OutputFormat::Json | OutputFormat::Yaml => {
                let result = json!({
                    "floating_ip_id": id,
                    "status": "deleted"
                });
                print_json_or_yaml(result, cli.output)?;
            }
        }
        Ok(())
    } else {
        let handler = FloatingIpHandler::new(client);
        let results = handler.delete(id).await?;

        handle_async_response(
            &results,
            cli.output,
            cli.query.as_deref(),
            &format!("Deletion of floating IP {} started", id),
        )
    }
}

async fn assign_floating_ip(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    id: &str,
    port_id: &str,
    fixed_ip: IpAddr,
) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = FloatingIpHandler::new(client);

    let request = FloatingIpCreateRequest::new(port_id, fixed_ip);
    let fip = handler.assign(id, &request).await?;

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => {
            println!("Floating IP assigned successfully");
            print_fip_details(&fip);
        }
        OutputFormat::Json => {
            print_output(&fip, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&fip, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}

async fn unassign_floating_ip(cli: &Cli, conn_mgr: &ConnectionManager, id: &str) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = FloatingIpHandler::new(client);

    let fip = handler.unassign(id).await?;

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => {
            println!("Floating IP {} detached", fip.id);
            if let Some(status) = &fip.status {
                println!("  Status: {}", format_status_text(status));
            }
        }
        OutputFormat::Json => {
            print_output(&fip, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&fip, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}

fn print_fip_details(fip: &FloatingIp) {
    println!("  ID: {}", fip.id);
    if let Some(address) = fip.floating_ip_address {
        println!("  Address: {}", address);
    }
    if let Some(port_id) = &fip.port_id {
        println!("  Port: {}", port_id);
    }
    if let Some(status) = &fip.status {
        println!("  Status: {}", format_status_text(status));
    }
}
