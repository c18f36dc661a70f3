//! Task tracking command implementations
//!
//! `task get` reports a one-off snapshot; `task wait` drives one or more
//! tasks to their terminal states through Layer 2 polling.

use crate::cli::{Cli, OutputFormat, TaskCommands};
use crate::commands::async_utils::{print_task_details, spinner_callback, task_spinner};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;
use nimbus_cloud::TaskHandler;
use std::time::Duration;

pub async fn handle_task_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    cmd: &TaskCommands,
) -> CliResult<()> {
    match cmd {
        TaskCommands::Get { id } => get_task(cli, conn_mgr, id).await,
        TaskCommands::Wait {
            ids,
            timeout,
            interval,
        } => wait_tasks(cli, conn_mgr, ids, *timeout, *interval).await,
    }
}

async fn get_task(cli: &Cli, conn_mgr: &ConnectionManager, id: &str) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = TaskHandler::new(client);

    let task = handler.get(id).await?;

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => print_task_details(&task)?,
        OutputFormat::Json => {
            print_output(&task, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&task, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}

async fn wait_tasks(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    ids: &[String],
    timeout: u64,
    interval: u64,
) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;

    let message = if ids.len() == 1 {
        format!("Waiting for task {}", ids[0])
    } else {
        format!("Waiting for {} tasks", ids.len())
    };
    let pb = task_spinner(message);
    let callback = spinner_callback(&pb);

    // Tasks are polled in order under one shared time budget
    let result = nimbusctl_core::wait_for_tasks(
        &client,
        ids,
        Duration::from_secs(timeout),
        Duration::from_secs(interval),
        Some(callback),
        true,
        |task| Ok(task.clone()),
    )
    .await;
    pb.finish_and_clear();
    let tasks = result?.unwrap_or_default();

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => {
            for task in &tasks {
                print_task_details(task)?;
            }
        }
        OutputFormat::Json => {
            print_output(&tasks, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&tasks, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}
