//! GPU image command implementations
//!
//! Uploads go through the Layer 2 workflow when --wait is set, so the caller
//! gets the finished image back. Without --wait the raw task envelope is
//! reported and the task can be tracked separately.

use crate::cli::{Cli, GpuImageCommands, GpuImageUploadArgs, OutputFormat};
use crate::commands::async_utils::{
    handle_async_response, parse_metadata, spinner_callback, task_spinner,
};
use crate::commands::utils::{format_date, format_size, format_status_text, truncate_string};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output::print_output;
use nimbus_cloud::gpu_images::GpuImageUploadRequest;
use nimbus_cloud::{GpuImageHandler, GpuImageKind};
use nimbusctl_core::upload_gpu_image_and_wait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub async fn handle_gpu_image_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    cmd: &GpuImageCommands,
) -> CliResult<()> {
    match cmd {
        GpuImageCommands::UploadBaremetal { args } => {
            upload_image(cli, conn_mgr, GpuImageKind::Baremetal, args).await
        }
        GpuImageCommands::UploadVirtual { args } => {
            upload_image(cli, conn_mgr, GpuImageKind::Virtual, args).await
        }
        GpuImageCommands::List { r#virtual } => {
            list_images(cli, conn_mgr, image_kind(*r#virtual)).await
        }
        GpuImageCommands::Get { id, r#virtual } => {
            get_image(cli, conn_mgr, image_kind(*r#virtual), id).await
        }
    }
}

fn image_kind(virtual_flag: bool) -> GpuImageKind {
    if virtual_flag {
        GpuImageKind::Virtual
    } else {
        GpuImageKind::Baremetal
    }
}

/// Build the upload request from CLI flags, validating metadata up front
fn build_upload_request(args: &GpuImageUploadArgs) -> CliResult<GpuImageUploadRequest> {
    let mut request = GpuImageUploadRequest::new(&args.url, &args.name);

    if let Some(policy) = args.ssh_key {
        request = request.with_ssh_key(policy);
    }
    if args.cow_format {
        request = request.with_cow_format(true);
    }
    if let Some(architecture) = args.architecture {
        request = request.with_architecture(architecture);
    }
    if let Some(os_distro) = &args.os_distro {
        request = request.with_os_distro(os_distro);
    }
    if let Some(os_type) = args.os_type {
        request = request.with_os_type(os_type);
    }
    if let Some(os_version) = &args.os_version {
        request = request.with_os_version(os_version);
    }
    if let Some(hw_firmware_type) = args.hw_firmware_type {
        request = request.with_hw_firmware_type(hw_firmware_type);
    }
    if let Some(metadata) = parse_metadata(&args.metadata)? {
        request = request.with_metadata(metadata);
    }

    Ok(request)
}

async fn upload_image(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    kind: GpuImageKind,
    args: &GpuImageUploadArgs,
) -> CliResult<()> {
    let request = build_upload_request(args)?;
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;

    if args.async_ops.wait {
        // Layer 2 workflow: register, poll the task, fetch the finished image
        let pb = task_spinner(format!("Uploading {} image {}...", kind, args.name));
        let callback = spinner_callback(&pb);

        let result = upload_gpu_image_and_wait(
            &client,
            kind,
            &request,
            Duration::from_secs(args.async_ops.wait_timeout),
            Duration::from_secs(args.async_ops.wait_interval),
            Some(callback),
        )
        .await;
        pb.finish_and_clear();
        let image = result?;

        match cli.output {
            OutputFormat::Auto | OutputFormat::Table => {
                println!("Image uploaded successfully");
                println!("  ID: {}", image.id);
                println!("  Name: {}", image.name);
                println!("  Status: {}", format_status_text(&image.status));
                if let Some(size) = image.size {
                    println!("  Size: {}", format_size(size));
                }
            }
            OutputFormat::Json => {
                print_output(&image, crate::output::OutputFormat::Json, cli.query.as_deref())?;
            }
            OutputFormat::Yaml => {
                print_output(&image, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
            }
        }
        Ok(())
    } else {
        let handler = GpuImageHandler::new(client, kind);
        let results = handler.upload(&request).await?;

        handle_async_response(
            &results,
            cli.output,
            cli.query.as_deref(),
            &format!("Upload of image '{}' started", args.name),
        )
    }
}

async fn list_images(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    kind: GpuImageKind,
) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = GpuImageHandler::new(client, kind);

    let images = handler.list_all().await?;
    debug!("Found {} {} images", images.len(), kind);

    match cli.output {
        OutputFormat::Auto | OutputFormat::Table => {
            if images.is_empty() {
                println!("No {} images found", kind);
                return Ok(());
            }

            let rows: Vec<Value> = images
                .iter()
                .map(|image| {
                    let os = match (&image.os_distro, &image.os_version) {
                        (Some(distro), Some(version)) => format!("{} {}", distro, version),
                        (Some(distro), None) => distro.clone(),
                        _ => "-".to_string(),
                    };
                    json!({
                        "id": image.id,
                        "name": truncate_string(&image.name, 40),
                        "os": os,
                        "size": image.size.map(format_size).unwrap_or_else(|| "-".to_string()),
                        "status": image.status,
                        "created": format_date(image.created_at.clone().unwrap_or_default()),
                    })
                })
                .collect();

            print_output(rows, crate::output::OutputFormat::Table, cli.query.as_deref())?;
        }
        OutputFormat::Json => {
            print_output(&images, crate::output::OutputFormat::Json, cli.query.as_deref())?;
        }
        OutputFormat::Yaml => {
            print_output(&images, crate::output::OutputFormat::Yaml, cli.query.as_deref())?;
        }
    }

    Ok(())
}

async fn get_image(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    kind: GpuImageKind,
    id: &str,
) -> CliResult<()> {
    let client = conn_mgr
        .create_client(cli.profile.as_deref(), cli.project, cli.region)
        .await?;
    let handler = GpuImageHandler::new(client, kind);

    let image = handler.get(id).await?;

    let format = match cli.output {
        OutputFormat::Auto | OutputFormat::Table => crate::output::OutputFormat::Table,
        OutputFormat::Json => crate::output::OutputFormat::Json,
        OutputFormat::Yaml => crate::output::OutputFormat::Yaml,
    };
    print_output(&image, format, cli.query.as_deref())?;

    Ok(())
}
