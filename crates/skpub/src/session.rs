//! Loading the plugin, configuration and credential a command works with.

use std::path::Path;

use anyhow::{Context, Result};
use skpub_config::{Config, PluginManifest, load_config_or_default, load_manifest_from_dir};
use skpub_github::{ClientSettings, GithubClient, HttpTransport, RepositoryRef, Token};
use skpub_registry::{
    CommitIdentity, DEFAULT_PR_BODY, PluginEntry, PluginSubmission, RegistrySettings,
};
use tracing::debug;

/// The plugin being published.
pub struct Plugin {
    pub manifest: PluginManifest,
    pub repo: RepositoryRef,
}

impl Plugin {
    /// Loads `package.json` from `dir` and resolves its repository.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest = load_manifest_from_dir(dir)
            .with_context(|| format!("failed to load package.json in {}", dir.display()))?;

        let repository = manifest
            .repository()
            .context("package.json has no \"repository\" field")?;
        let repo: RepositoryRef = repository
            .parse()
            .context("package.json \"repository\" is not a GitHub repository")?;

        debug!(name = manifest.plugin_name(), %repo, "loaded plugin");
        Ok(Self { manifest, repo })
    }

    /// Builds the registry submission for this plugin.
    pub fn submission(&self) -> PluginSubmission {
        let entry = PluginEntry::from_manifest(&self.manifest, &self.repo);
        PluginSubmission::new(self.repo.clone(), entry)
    }
}

/// Loads `skpub.toml` from `dir` or its parents, falling back to defaults.
pub fn load_config(dir: &Path) -> Result<Config> {
    load_config_or_default(dir).context("failed to load skpub.toml")
}

/// Creates an authenticated client.
pub fn client(config: &Config, token: Option<String>) -> Result<GithubClient> {
    let token = Token::from_option(token)?;
    let settings = ClientSettings {
        api_url: config.github.api_url.clone(),
        uploads_url: config.github.uploads_url.clone(),
        user_agent: config.github.user_agent.clone(),
    };
    Ok(GithubClient::with_transport(
        HttpTransport::new(),
        token,
        settings,
    ))
}

/// Builds registry settings from configuration.
pub fn registry_settings(config: &Config) -> Result<RegistrySettings> {
    let upstream: RepositoryRef = config
        .registry
        .repository
        .parse()
        .context("invalid registry.repository")?;

    Ok(RegistrySettings {
        upstream,
        file: config.registry.file.clone(),
        base_branch: config.registry.branch.clone(),
        committer: CommitIdentity {
            name: config.registry.committer_name.clone(),
            email: config.registry.committer_email.clone(),
        },
        pr_body_template: config
            .registry
            .pr_body
            .clone()
            .unwrap_or_else(|| DEFAULT_PR_BODY.to_string()),
    })
}
