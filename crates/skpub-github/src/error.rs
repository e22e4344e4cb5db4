//! Error types for GitHub API access.

use std::path::PathBuf;

/// Result type for GitHub operations.
pub type GithubResult<T> = Result<T, GithubError>;

/// GitHub error types.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The request never produced a response.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    ///
    /// `details` holds the response body with the redacted request attached.
    #[error("GitHub API responded with status {status}:\n{details}")]
    Api { status: u16, details: String },

    /// No credential was supplied.
    #[error("You are not logged in. Set GITHUB_TOKEN or pass --token first.")]
    NotLoggedIn,

    /// The credential cannot push to the repository.
    #[error(
        "You don't have the right permissions on {repo}. Need the \"push\" permission and only got:\n{permissions}"
    )]
    MissingPushPermission { repo: String, permissions: String },

    /// Failed to read the local release asset.
    #[error("failed to read release asset {path}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode a response body.
    #[error("failed to decode {what} response")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid `owner/name` repository reference.
    #[error("invalid repository reference: {0}. Expected \"owner/name\"")]
    InvalidRepository(String),
}

impl GithubError {
    /// Returns the HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when the server rejected a write against stale state
    /// (stale file sha, non-fast-forward ref update).
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409 | 422))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = GithubError::Api {
            status: 404,
            details: "{\"message\": \"Not Found\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GitHub API responded with status 404:\n{\"message\": \"Not Found\"}"
        );
    }

    #[test]
    fn test_status_only_for_api_errors() {
        let api = GithubError::Api {
            status: 409,
            details: String::new(),
        };
        assert_eq!(api.status(), Some(409));
        assert!(api.is_conflict());

        assert_eq!(GithubError::NotLoggedIn.status(), None);
        assert!(!GithubError::NotLoggedIn.is_conflict());
    }

    #[test]
    fn test_unprocessable_is_conflict() {
        let err = GithubError::Api {
            status: 422,
            details: String::new(),
        };
        assert!(err.is_conflict());
    }

    #[test]
    fn test_not_found_is_not_conflict() {
        let err = GithubError::Api {
            status: 404,
            details: String::new(),
        };
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_invalid_repository_display() {
        let err = GithubError::InvalidRepository("nope".to_string());
        assert_eq!(
            err.to_string(),
            "invalid repository reference: nope. Expected \"owner/name\""
        );
    }
}
