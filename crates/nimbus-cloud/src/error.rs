//! Error types for the Nimbus Cloud API client
//!
//! HTTP failures are mapped to variants by status class so callers can
//! branch without string-matching, and every variant keeps the
//! server-provided message intact.
//!
//! # Example
//!
//! ```rust
//! use nimbus_cloud::CloudError;
//!
//! let err = CloudError::NotFound {
//!     message: "Floating IP not found".to_string(),
//! };
//! assert!(err.is_not_found());
//! assert!(!err.is_retryable());
//! ```

use thiserror::Error;

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, CloudError>;

/// Errors returned by the Nimbus Cloud API client
#[derive(Error, Debug)]
pub enum CloudError {
    /// Could not reach the API (DNS, TLS, connection refused, ...)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// 400 - the server rejected the request body or parameters
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// 401 - missing or invalid API key
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// 403 - the API key lacks access to this project or resource
    #[error("Access denied: {message}")]
    Forbidden { message: String },

    /// 404 - resource does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 409/412 - the resource is in a state that rejects this operation
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// 429 - request quota exhausted
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// 5xx - server-side failure
    #[error("Server error ({code}): {message}")]
    ServerError { code: u16, message: String },

    /// Any other non-success status
    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    /// The response body could not be decoded as the expected JSON shape
    #[error("Invalid response body: {0}")]
    Json(String),

    /// Client-side validation failed before any request was sent
    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl CloudError {
    /// Map an HTTP status code and response body to an error variant.
    ///
    /// Nimbus error bodies carry `{"message": "..."}`; when the body is not
    /// that shape the raw text is kept instead.
    pub(crate) fn from_status(code: u16, body: &str) -> Self {
        let message = extract_message(body);
        match code {
            400 => CloudError::BadRequest { message },
            401 => CloudError::AuthenticationFailed { message },
            403 => CloudError::Forbidden { message },
            404 => CloudError::NotFound { message },
            409 | 412 => CloudError::Conflict { message },
            429 => CloudError::RateLimited { message },
            code if code >= 500 => CloudError::ServerError { code, message },
            code => CloudError::ApiError { code, message },
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CloudError::AuthenticationFailed { .. } | CloudError::Forbidden { .. }
        )
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CloudError::ServerError { .. })
    }

    /// Returns true if the request timed out client-side
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CloudError::Timeout(_))
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CloudError::RateLimited { .. })
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, CloudError::Conflict { .. })
    }

    /// Returns true if this is a bad request error (400) or failed client-side
    /// validation
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            CloudError::BadRequest { .. } | CloudError::ValidationError { .. }
        )
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CloudError::ConnectionError(_)
                | CloudError::Timeout(_)
                | CloudError::RateLimited { .. }
                | CloudError::ServerError { .. }
        )
    }
}

fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
