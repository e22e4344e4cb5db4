//! Registry error types.

use skpub_github::GithubError;
use thiserror::Error;

/// Registry-related errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A GitHub call failed.
    #[error("registry request failed: {0}")]
    Github(#[from] GithubError),

    /// The registry file content is not valid base64.
    #[error("registry file is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The registry file is not UTF-8.
    #[error("registry file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The registry file is not valid JSON.
    #[error("registry file is not valid JSON: {0}")]
    InvalidIndex(#[source] serde_json::Error),

    /// The registry file is JSON but not an array.
    #[error("registry file must contain a JSON array")]
    NotAnArray,

    /// Failed to serialize the updated registry.
    #[error("failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl RegistryError {
    /// Returns true when the server rejected a write against stale state.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Github(err) if err.is_conflict())
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
