//! Profile management commands
//!
//! Profiles hold API credentials and default project/region scope, stored in
//! the TOML config file. Environment variables can still override the active
//! profile at connection time, see [`crate::connection`].

use colored::Colorize;
use serde_json::json;
use tracing::{debug, trace};

use crate::cli::{OutputFormat, ProfileCommands};
use crate::commands::utils::{confirm_action, key_preview};
use crate::connection::ConnectionManager;
use crate::error::{NimbusCtlError, Result as CliResult};
use crate::output;
use nimbusctl_core::{Config, Profile};

pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format).await,
        Path => handle_path(conn_mgr, output_format).await,
        Show { name } => handle_show(conn_mgr, name, output_format).await,
        Set {
            name,
            api_key,
            api_url,
            project,
            region,
        } => handle_set(conn_mgr, name, api_key, api_url, *project, *region).await,
        Remove { name } => handle_remove(conn_mgr, name).await,
        Default { name } => handle_default(conn_mgr, name).await,
    }
}

async fn handle_list(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let config_path = conn_mgr
                .config_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .or_else(|| {
                    Config::config_path()
                        .ok()
                        .and_then(|p| p.to_str().map(String::from))
                });

            let profile_list: Vec<serde_json::Value> = profiles
                .iter()
                .map(|(name, profile)| {
                    let mut obj = json!({
                        "name": name.as_str(),
                        "api_url": profile.api_url,
                        "is_default": conn_mgr.config.default_profile.as_deref()
                            == Some(name.as_str()),
                    });
                    if let Some(project_id) = profile.project_id {
                        obj["project_id"] = json!(project_id);
                    }
                    if let Some(region_id) = profile.region_id {
                        obj["region_id"] = json!(region_id);
                    }
                    obj
                })
                .collect();

            let output_data = json!({
                "config_path": config_path,
                "profiles": profile_list,
                "count": profiles.len()
            });

            let fmt = match output_format {
                OutputFormat::Json => output::OutputFormat::Json,
                OutputFormat::Yaml => output::OutputFormat::Yaml,
                _ => output::OutputFormat::Json,
            };

            output::print_output(&output_data, fmt, None)?;
        }
        _ => {
            // Show config file path at the top
            if let Some(ref path) = conn_mgr.config_path {
                println!("Configuration file: {}", path.display());
                println!();
            } else if let Ok(config_path) = Config::config_path() {
                println!("Configuration file: {}", config_path.display());
                println!();
            }

            if profiles.is_empty() {
                println!("No profiles configured.");
                println!("Use 'nimbusctl profile set' to create a profile.");
                return Ok(());
            }

            for (name, profile) in &profiles {
                if conn_mgr.config.default_profile.as_deref() == Some(name.as_str()) {
                    println!("  {} {}", name.bold().cyan(), "(default)".green());
                } else {
                    println!("  {}", name.bold().cyan());
                }
                println!("    {} {}", "URL:".dimmed(), profile.api_url);
                if let Some(project_id) = profile.project_id {
                    println!("    {} {}", "Project:".dimmed(), project_id);
                }
                if let Some(region_id) = profile.region_id {
                    println!("    {} {}", "Region:".dimmed(), region_id);
                }
            }
        }
    }

    Ok(())
}

async fn handle_path(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    let config_path = match conn_mgr.config_path {
        Some(ref path) => path.clone(),
        None => Config::config_path()?,
    };

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let output_data = json!({
                "config_path": config_path.to_str()
            });

            let fmt = match output_format {
                OutputFormat::Json => output::OutputFormat::Json,
                OutputFormat::Yaml => output::OutputFormat::Yaml,
                _ => output::OutputFormat::Json,
            };

            output::print_output(&output_data, fmt, None)?;
        }
        _ => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

async fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    match conn_mgr.config.get_profile(name) {
        Some(profile) => {
            let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
            let api_key_preview = format!("{}...", key_preview(&profile.api_key));

            match output_format {
                OutputFormat::Json | OutputFormat::Yaml => {
                    let mut output_data = json!({
                        "name": name,
                        "api_key_preview": api_key_preview,
                        "api_url": profile.api_url,
                        "is_default": is_default,
                    });
                    if let Some(project_id) = profile.project_id {
                        output_data["project_id"] = json!(project_id);
                    }
                    if let Some(region_id) = profile.region_id {
                        output_data["region_id"] = json!(region_id);
                    }

                    let fmt = match output_format {
                        OutputFormat::Json => output::OutputFormat::Json,
                        OutputFormat::Yaml => output::OutputFormat::Yaml,
                        _ => output::OutputFormat::Json,
                    };

                    output::print_output(&output_data, fmt, None)?;
                }
                _ => {
                    println!("Profile: {}", name);
                    println!("API Key: {}", api_key_preview);
                    println!("API URL: {}", profile.api_url);
                    if let Some(project_id) = profile.project_id {
                        println!("Project: {}", project_id);
                    }
                    if let Some(region_id) = profile.region_id {
                        println!("Region: {}", region_id);
                    }
                    if is_default {
                        println!("Default: yes");
                    }
                }
            }

            Ok(())
        }
        None => Err(NimbusCtlError::ProfileNotFound { name: name.into() }),
    }
}

async fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    api_key: &str,
    api_url: &str,
    project: Option<u32>,
    region: Option<u32>,
) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    // Ask for confirmation before overwriting an existing profile
    if conn_mgr.config.get_profile(name).is_some() {
        println!("Profile '{}' already exists.", name);
        if !confirm_action(&format!("update profile '{}'", name))? {
            println!("Profile update cancelled.");
            return Ok(());
        }
    }

    let profile = Profile {
        api_key: api_key.to_string(),
        api_url: api_url.to_string(),
        project_id: project,
        region_id: region,
    };

    let mut config = conn_mgr.config.clone();
    config.set_profile(name.to_string(), profile);

    conn_mgr.save_config(&config)?;
    report_saved(conn_mgr, name);

    // Suggest setting as default when it's the only profile
    if config.profiles.len() == 1 && config.default_profile.is_none() {
        println!();
        println!("Tip: Set as the default profile with:");
        println!("  nimbusctl profile default {}", name);
    }

    Ok(())
}

fn report_saved(conn_mgr: &ConnectionManager, name: &str) {
    if let Some(ref path) = conn_mgr.config_path {
        println!("Profile '{}' saved successfully to:", name);
        println!("  {}", path.display());
    } else if let Ok(config_path) = Config::config_path() {
        println!("Profile '{}' saved successfully to:", name);
        println!("  {}", config_path.display());
    } else {
        println!("Profile '{}' saved successfully.", name);
    }
}

async fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    if conn_mgr.config.get_profile(name).is_none() {
        return Err(NimbusCtlError::ProfileNotFound { name: name.into() });
    }

    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if is_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    if !confirm_action(&format!("remove profile '{}'", name))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    let mut config = conn_mgr.config.clone();
    config.remove_profile(name);

    conn_mgr.save_config(&config)?;

    if is_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

async fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if conn_mgr.config.get_profile(name).is_none() {
        return Err(NimbusCtlError::ProfileNotFound { name: name.into() });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());

    conn_mgr.save_config(&config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}
