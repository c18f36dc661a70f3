//! Connection management for Nimbus Cloud clients

use crate::error::Result as CliResult;
use anyhow::Context;
use nimbus_cloud::{CloudClient, DEFAULT_API_URL};
use nimbusctl_core::Config;
use tracing::{debug, info, trace, warn};

/// User agent string for nimbusctl HTTP requests
const NIMBUSCTL_USER_AGENT: &str = concat!("nimbusctl/", env!("CARGO_PKG_VERSION"));

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save a configuration to the explicit --config-file path when one was
    /// given, or to the standard location otherwise
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Create a Nimbus Cloud client from profile credentials with environment
    /// variable override support.
    ///
    /// When --config-file is explicitly specified, environment variables are ignored
    /// to provide true configuration isolation. This allows testing with isolated
    /// configs and follows the principle of "explicit wins" (CLI args > env vars >
    /// defaults). Project and region overrides come from the global --project and
    /// --region flags and always win over env vars and profile values.
    pub async fn create_client(
        &self,
        profile_name: Option<&str>,
        project_override: Option<u32>,
        region_override: Option<u32>,
    ) -> CliResult<CloudClient> {
        debug!("Creating Nimbus Cloud client");
        trace!("Profile name: {:?}", profile_name);

        // When --config-file is explicitly specified, ignore environment variables
        let use_env_vars = self.config_path.is_none();

        debug!(
            "Config path: {:?}, use_env_vars: {}",
            self.config_path, use_env_vars
        );

        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        // Check which environment variables are present (only if we're using them)
        let env_api_key = if use_env_vars {
            std::env::var("NIMBUS_API_KEY").ok()
        } else {
            None
        };
        let env_api_url = if use_env_vars {
            std::env::var("NIMBUS_API_URL").ok()
        } else {
            None
        };
        let env_project_id = if use_env_vars {
            env_scope_var("NIMBUS_PROJECT_ID")
        } else {
            None
        };
        let env_region_id = if use_env_vars {
            env_scope_var("NIMBUS_REGION_ID")
        } else {
            None
        };

        if env_api_key.is_some() {
            debug!("Found NIMBUS_API_KEY environment variable");
        }
        if env_api_url.is_some() {
            debug!("Found NIMBUS_API_URL environment variable");
        }

        let (final_api_key, final_api_url, final_project_id, final_region_id) =
            if let Some(key) = &env_api_key {
                // Environment variables provide complete credentials
                info!("Using Nimbus Cloud credentials from environment variables");
                let url = env_api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
                let project_id = project_override.or(env_project_id);
                let region_id = region_override.or(env_region_id);
                (key.clone(), url, project_id, region_id)
            } else {
                // Resolve the profile from explicit name or the configured default
                let resolved_profile_name = self.config.resolve_profile(profile_name)?;
                info!("Using Nimbus Cloud profile: {}", resolved_profile_name);

                let profile = self
                    .config
                    .get_profile(&resolved_profile_name)
                    .with_context(|| format!("Profile '{}' not found", resolved_profile_name))?;

                // Check for partial overrides before consuming the Options
                let has_overrides = env_api_url.is_some()
                    || env_project_id.is_some()
                    || env_region_id.is_some();

                // Allow partial environment variable overrides of profile values
                let url = env_api_url.unwrap_or_else(|| profile.api_url.clone());
                let project_id = project_override
                    .or(env_project_id)
                    .or(profile.project_id);
                let region_id = region_override.or(env_region_id).or(profile.region_id);

                if has_overrides {
                    debug!("Applied partial environment variable overrides");
                }

                (profile.api_key.clone(), url, project_id, region_id)
            };

        info!("Connecting to Nimbus Cloud API: {}", final_api_url);
        trace!(
            "API key: {}...",
            crate::commands::utils::key_preview(&final_api_key)
        );
        debug!(
            "Scope: project_id={:?}, region_id={:?}",
            final_project_id, final_region_id
        );

        // Create and configure the client
        let mut builder = CloudClient::builder()
            .api_key(&final_api_key)
            .base_url(&final_api_url)
            .user_agent(NIMBUSCTL_USER_AGENT);

        if let Some(project_id) = final_project_id {
            builder = builder.project_id(project_id);
        }
        if let Some(region_id) = final_region_id {
            builder = builder.region_id(region_id);
        }

        let client = builder
            .build()
            .context("Failed to create Nimbus Cloud client")?;

        debug!("Nimbus Cloud client created successfully");
        Ok(client)
    }
}

/// Read a numeric scope id from the environment, ignoring malformed values.
fn env_scope_var(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}: '{}' is not a valid numeric id", name, raw);
            None
        }
    }
}
