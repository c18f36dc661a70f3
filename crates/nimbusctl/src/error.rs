//! Error types for nimbusctl
//!
//! Defines structured error types using thiserror for better error handling and user experience.

use std::fmt::Write as _;

use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: list available profiles:
///       nimbusctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    #[allow(dead_code)]
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Render the diagnostic with colored formatting.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}{}", "error".red().bold(), ": ".bold());
        let _ = write!(out, "{}", self.message);

        if let Some(detail) = &self.detail {
            let _ = write!(out, "\n  {}", detail);
        }

        for (description, commands) in &self.tips {
            let _ = write!(out, "\n\n  {}{}", "tip".yellow().bold(), ": ".bold());
            let _ = write!(out, "{}", description);
            for cmd in commands {
                let _ = write!(out, "\n      {}", cmd);
            }
        }

        out
    }
}

/// Main error type for the nimbusctl application
#[derive(Error, Debug)]
pub enum NimbusCtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'nimbusctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for nimbusctl operations
pub type Result<T> = std::result::Result<T, NimbusCtlError>;

impl NimbusCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            NimbusCtlError::ProfileNotFound { name } => vec![
                "List available profiles: nimbusctl profile list".to_string(),
                format!("Create profile '{}': nimbusctl profile set {} --api-key <key>", name, name),
                "Check profile name spelling".to_string(),
            ],
            NimbusCtlError::NoProfileConfigured => vec![
                "Create a profile: nimbusctl profile set <name> --api-key <key>".to_string(),
                "Or set the NIMBUS_API_KEY environment variable".to_string(),
                "View profile documentation: nimbusctl profile --help".to_string(),
            ],
            NimbusCtlError::AuthenticationFailed { .. } => vec![
                "Check your credentials: nimbusctl profile show <profile>".to_string(),
                "Verify the API key is valid and not expired".to_string(),
                "Ensure the API endpoint URL is correct".to_string(),
            ],
            NimbusCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL is correct: nimbusctl profile show <profile>".to_string(),
                "Ensure firewall allows connections to the API endpoint".to_string(),
            ],
            NimbusCtlError::ApiError { message } if message.contains("404") => vec![
                "Verify the resource ID is correct".to_string(),
                "List available resources to find the correct ID".to_string(),
                "Check that you're using the correct profile".to_string(),
            ],
            NimbusCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: nimbusctl <command> --help".to_string(),
                "Verify input file format is correct (JSON)".to_string(),
            ],
            NimbusCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
                "Ensure file path is correct (use absolute path if needed)".to_string(),
            ],
            NimbusCtlError::Timeout { .. } => vec![
                "Increase the wait budget with --wait-timeout".to_string(),
                "Check the task later: nimbusctl task get <task-id>".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Render the error plus its suggestions as a cargo-style diagnostic.
    pub fn display_with_suggestions(&self) -> String {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.render()
    }
}

impl From<nimbus_cloud::CloudError> for NimbusCtlError {
    fn from(err: nimbus_cloud::CloudError) -> Self {
        match err {
            nimbus_cloud::CloudError::AuthenticationFailed { message } => {
                NimbusCtlError::AuthenticationFailed { message }
            }
            nimbus_cloud::CloudError::ConnectionError(message) => {
                NimbusCtlError::ConnectionError { message }
            }
            nimbus_cloud::CloudError::Timeout(message) => NimbusCtlError::Timeout { message },
            nimbus_cloud::CloudError::ValidationError { message } => {
                NimbusCtlError::InvalidInput { message }
            }
            _ => NimbusCtlError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<nimbusctl_core::CoreError> for NimbusCtlError {
    fn from(err: nimbusctl_core::CoreError) -> Self {
        match err {
            nimbusctl_core::CoreError::TaskTimeout(duration) => NimbusCtlError::Timeout {
                message: format!("Operation timed out after {} seconds", duration.as_secs()),
            },
            nimbusctl_core::CoreError::TaskFailed(msg) => NimbusCtlError::ApiError {
                message: format!("Task failed: {}", msg),
            },
            nimbusctl_core::CoreError::Validation(msg) => {
                NimbusCtlError::InvalidInput { message: msg }
            }
            nimbusctl_core::CoreError::Config(config_err) => NimbusCtlError::from(config_err),
            nimbusctl_core::CoreError::Cloud(cloud_err) => NimbusCtlError::from(cloud_err),
        }
    }
}

impl From<nimbusctl_core::ConfigError> for NimbusCtlError {
    fn from(err: nimbusctl_core::ConfigError) -> Self {
        match err {
            nimbusctl_core::ConfigError::ProfileNotFound { name } => {
                NimbusCtlError::ProfileNotFound { name }
            }
            nimbusctl_core::ConfigError::NoProfiles { .. } => NimbusCtlError::NoProfileConfigured,
            _ => NimbusCtlError::Config(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for NimbusCtlError {
    fn from(err: serde_json::Error) -> Self {
        NimbusCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for NimbusCtlError {
    fn from(err: std::io::Error) -> Self {
        NimbusCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for NimbusCtlError {
    fn from(err: anyhow::Error) -> Self {
        NimbusCtlError::Config(err.to_string())
    }
}
