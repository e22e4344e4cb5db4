//! Identity and permission checks.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{GithubClient, GithubError, GithubResult, RepositoryRef, Transport};

/// The authenticated user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Login name.
    pub login: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Repository metadata as seen by the authenticated user.
#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    #[serde(default)]
    permissions: Map<String, Value>,
}

impl<T: Transport> GithubClient<T> {
    /// Fetches the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn get_user(&self) -> GithubResult<User> {
        self.get_json("/user", "user").await
    }

    /// Verifies the credential can push to `repo`.
    ///
    /// Run this before any mutating call so permission problems surface as
    /// a readable error instead of a rejected write.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingPushPermission`] if the `push`
    /// permission is absent, or the request error.
    pub async fn ensure_push_access(&self, repo: &RepositoryRef) -> GithubResult<()> {
        let info: RepositoryInfo = self
            .get_json(&format!("/repos/{repo}"), "repository")
            .await?;

        let can_push = info
            .permissions
            .get("push")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !can_push {
            let permissions = serde_json::to_string_pretty(&Value::Object(info.permissions))
                .unwrap_or_default();
            return Err(GithubError::MissingPushPermission {
                repo: repo.to_string(),
                permissions,
            });
        }

        debug!(%repo, "push permission confirmed");
        Ok(())
    }
}
