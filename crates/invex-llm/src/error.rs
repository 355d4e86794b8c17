//! Error types for the provider layer.

use thiserror::Error;

/// Errors that can occur while calling a language model provider.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider endpoint could not be reached.
    #[error("cannot connect to provider at {0}")]
    Connection(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The provider answered with a non-success status (auth, quota, bad request).
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider response body could not be decoded.
    #[error("failed to parse provider response: {0}")]
    ResponseParsing(String),

    /// The client is missing required settings (key, deployment, ...).
    #[error("invalid provider configuration: {0}")]
    Configuration(String),

    /// Any other transport failure.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl LlmError {
    /// Whether the failure is an authentication or authorization rejection.
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Status { status: 401 | 403, .. })
    }
}
