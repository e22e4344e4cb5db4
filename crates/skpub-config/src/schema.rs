//! Configuration schema.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub endpoint configuration.
    #[serde(default)]
    pub github: GithubConfig,

    /// Plugin registry configuration.
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Config {
    /// Checks values that cannot be expressed through the schema alone.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> crate::ConfigResult<()> {
        let required = [
            ("github.api_url", &self.github.api_url),
            ("github.uploads_url", &self.github.uploads_url),
            ("github.user_agent", &self.github.user_agent),
            ("registry.repository", &self.registry.repository),
            ("registry.file", &self.registry.file),
            ("registry.branch", &self.registry.branch),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(crate::ConfigError::Invalid(format!("{key} is empty")));
            }
        }

        if self.registry.repository.split('/').count() != 2 {
            return Err(crate::ConfigError::Invalid(format!(
                "registry.repository must be \"owner/name\", got {:?}",
                self.registry.repository
            )));
        }

        Ok(())
    }
}

/// GitHub endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Release asset upload base URL.
    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            uploads_url: default_uploads_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_uploads_url() -> String {
    "https://uploads.github.com".to_string()
}

fn default_user_agent() -> String {
    "skpub-release-agent".to_string()
}

/// Plugin registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Upstream registry repository (`owner/name`).
    #[serde(default = "default_registry_repository")]
    pub repository: String,

    /// Tracked registry file.
    #[serde(default = "default_registry_file")]
    pub file: String,

    /// Upstream default branch.
    #[serde(default = "default_registry_branch")]
    pub branch: String,

    /// Name used for registry commits.
    #[serde(default = "default_committer_name")]
    pub committer_name: String,

    /// Email used for registry commits.
    #[serde(default = "default_committer_email")]
    pub committer_email: String,

    /// Pull request body; `{homepage}` is replaced by the plugin homepage.
    /// The built-in greeting is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_body: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repository: default_registry_repository(),
            file: default_registry_file(),
            branch: default_registry_branch(),
            committer_name: default_committer_name(),
            committer_email: default_committer_email(),
            pr_body: None,
        }
    }
}

fn default_registry_repository() -> String {
    "sketchplugins/plugin-directory".to_string()
}

fn default_registry_file() -> String {
    "plugins.json".to_string()
}

fn default_registry_branch() -> String {
    "master".to_string()
}

fn default_committer_name() -> String {
    "skpm-bot".to_string()
}

fn default_committer_email() -> String {
    "bot@skpm.io".to_string()
}
