//! Unified error handling for nimbusctl-core
//!
//! Wraps API and configuration errors with consistent helper methods.
//!
//! # Example
//!
//! ```rust
//! use nimbusctl_core::{CoreError, Result};
//! use nimbus_cloud::CloudError;
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_not_found() {
//!         println!("Resource not found");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! // Cloud errors are automatically converted
//! let cloud_err = CloudError::NotFound { message: "Image not found".to_string() };
//! let core_err: CoreError = cloud_err.into();
//! assert!(core_err.is_not_found());
//! ```

use std::time::Duration;
use thiserror::Error;

/// Core error type wrapping API, task, and configuration failures
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the Nimbus Cloud API
    #[error("Cloud API error: {0}")]
    Cloud(#[from] nimbus_cloud::CloudError),

    /// Task polling exceeded its deadline
    #[error("Task timed out after {0:?}")]
    TaskTimeout(Duration),

    /// Task reached the ERROR state; carries the server-reported text
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Validation error (e.g., malformed metadata)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_timeout(),
            CoreError::TaskTimeout(_) => true,
            _ => false,
        }
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_rate_limited(),
            _ => false,
        }
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_conflict(),
            _ => false,
        }
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_bad_request(),
            CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_retryable(),
            CoreError::TaskTimeout(_) => true, // Timeout might succeed on retry
            _ => false,
        }
    }
}
