//! SecureSuite error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the SecureSuite API.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The license file does not exist.
    #[error("License file not found: {}", path.display())]
    CredentialNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The license file exists but could not be read.
    #[error("Failed to read license file: {0}")]
    CredentialUnreadable(String),

    /// HTTP transport error (connect, timeout, body read).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Response body was not JSON or lacked an expected field.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The server rejected the token (HTTP 401).
    #[error("Token rejected by server (401)")]
    Unauthorized,

    /// Any non-200, non-401 status.
    #[error("API responded with status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for display.
        body: String,
    },

    /// Token cache I/O error.
    #[error("Cache I/O error: {0}")]
    CacheIO(String),

    /// Writing a benchmark list, archive or report failed.
    #[error("Output I/O error: {0}")]
    OutputIO(String),
}

impl WorkbenchError {
    /// Whether a forced token refresh may fix this error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WorkbenchError::Unauthorized)
    }
}
