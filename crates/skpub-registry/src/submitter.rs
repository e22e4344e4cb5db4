//! Registry submission workflow.
//!
//! Submitting a plugin walks through these steps, each taking the context
//! produced by the previous one:
//!
//! 1. [`RegistrySubmitter::fetch_upstream`] reads the upstream registry file.
//! 2. The existence check stops the run if the plugin is already listed.
//! 3. [`RegistrySubmitter::fork_upstream`] gets or creates the fork.
//! 4. [`RegistrySubmitter::prepare_branch`] recreates the feature branch on
//!    top of the latest upstream head.
//! 5. [`RegistrySubmitter::commit_entry`] writes the updated registry file.
//! 6. [`RegistrySubmitter::open_pull_request`] opens the pull request.
//!
//! State lives on GitHub only. Nothing is rolled back on failure; the next
//! run deletes the stale feature branch before starting over.

use serde::Deserialize;
use serde_json::json;
use skpub_github::{GithubClient, GithubResult, Method, RepositoryRef, Transport};
use tracing::{debug, info};

use crate::{PluginEntry, RegistryIndex, RegistryResult};

/// Default pull request body. `{homepage}` is replaced by the plugin homepage.
pub const DEFAULT_PR_BODY: &str = "Hello :wave:

The plugin is [here]({homepage}) if you want to have a look.

Hope you are having a great day :)
";

/// Git identity used for registry commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "skpm-bot".to_string(),
            email: "bot@skpm.io".to_string(),
        }
    }
}

/// Static registry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Upstream registry repository.
    pub upstream: RepositoryRef,
    /// Path of the tracked registry file.
    pub file: String,
    /// Upstream branch pull requests target.
    pub base_branch: String,
    /// Committer of the registry update.
    pub committer: CommitIdentity,
    /// Pull request body template.
    pub pr_body_template: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            upstream: RepositoryRef::new("sketchplugins", "plugin-directory"),
            file: "plugins.json".to_string(),
            base_branch: "master".to_string(),
            committer: CommitIdentity::default(),
            pr_body_template: DEFAULT_PR_BODY.to_string(),
        }
    }
}

/// A plugin to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSubmission {
    /// The plugin's own repository.
    pub repo: RepositoryRef,
    /// The entry to append.
    pub entry: PluginEntry,
}

impl PluginSubmission {
    /// Creates a submission.
    #[must_use]
    pub fn new(repo: RepositoryRef, entry: PluginEntry) -> Self {
        Self { repo, entry }
    }

    /// Returns the feature branch name, `owner/name` of the plugin.
    #[must_use]
    pub fn branch_name(&self) -> String {
        self.repo.to_string()
    }
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The registry already lists the plugin; nothing was changed.
    AlreadyRegistered,
    /// A pull request was opened.
    Submitted(PullRequest),
}

/// An opened pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Web page of the pull request.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// The submitter's fork of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fork {
    /// `owner/name` of the fork.
    pub full_name: String,
    /// Owner of the fork.
    pub owner: ForkOwner,
}

/// Owner of a fork.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForkOwner {
    pub login: String,
}

/// Upstream registry as read in step 1.
#[derive(Debug, Clone)]
pub struct UpstreamRegistry {
    /// Decoded registry entries.
    pub index: RegistryIndex,
}

/// Feature branch ready for the file update.
#[derive(Debug, Clone)]
pub struct PreparedBranch {
    pub fork: Fork,
    /// Feature branch name.
    pub branch: String,
    /// Blob sha of the registry file on the feature branch.
    pub file_sha: String,
}

/// Feature branch carrying the new entry.
#[derive(Debug, Clone)]
pub struct CommittedEntry {
    pub fork: Fork,
    pub branch: String,
}

#[derive(Deserialize)]
struct FileContents {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

/// Registers plugins in the shared registry through a fork and pull request.
pub struct RegistrySubmitter<'a, T> {
    client: &'a GithubClient<T>,
    settings: RegistrySettings,
}

impl<'a, T: Transport> RegistrySubmitter<'a, T> {
    /// Creates a submitter.
    #[must_use]
    pub fn new(client: &'a GithubClient<T>, settings: RegistrySettings) -> Self {
        Self { client, settings }
    }

    /// Runs the whole workflow.
    ///
    /// The existence check runs before any mutating call, so repeated
    /// submissions of the same plugin are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error. Already created forks and
    /// branches are left in place.
    pub async fn submit(&self, plugin: &PluginSubmission) -> RegistryResult<SubmissionOutcome> {
        let upstream = self.fetch_upstream().await?;

        if let Some(existing) = upstream
            .index
            .find_existing(&plugin.entry.title, &plugin.entry.name)
        {
            info!(repo = %plugin.repo, ?existing, "plugin already registered");
            return Ok(SubmissionOutcome::AlreadyRegistered);
        }

        let fork = self.fork_upstream().await?;
        let prepared = self.prepare_branch(fork, &plugin.branch_name()).await?;
        let committed = self.commit_entry(&upstream, prepared, plugin).await?;
        let pull_request = self.open_pull_request(&committed, plugin).await?;

        Ok(SubmissionOutcome::Submitted(pull_request))
    }

    /// Step 1: reads and decodes the upstream registry file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be fetched or decoded.
    pub async fn fetch_upstream(&self) -> RegistryResult<UpstreamRegistry> {
        let path = format!(
            "/repos/{}/contents/{}",
            self.settings.upstream, self.settings.file
        );
        let file: FileContents = self.client.get_json(&path, "registry file").await?;
        let index = RegistryIndex::from_base64(&file.content)?;

        debug!(entries = index.len(), sha = %file.sha, "fetched upstream registry");
        Ok(UpstreamRegistry { index })
    }

    /// Step 3: forks the upstream registry.
    ///
    /// GitHub returns the existing fork when there already is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the fork cannot be created.
    pub async fn fork_upstream(&self) -> RegistryResult<Fork> {
        let url = self
            .client
            .api_url(&format!("/repos/{}/forks", self.settings.upstream));
        let request = self.client.request(Method::Post, url);
        let fork: Fork = self.client.send_json(request, "fork").await?;

        info!(fork = %fork.full_name, "using registry fork");
        Ok(fork)
    }

    /// Step 4: recreates `branch` on the fork at the latest upstream head.
    ///
    /// Any leftover branch from an earlier run is deleted first. If the
    /// fork's base branch lags behind upstream it is fast-forwarded; a fork
    /// that is ahead makes the update, and the run, fail.
    ///
    /// # Errors
    ///
    /// Returns an error if a head cannot be read, the fast-forward is
    /// rejected, or the branch cannot be created.
    pub async fn prepare_branch(&self, fork: Fork, branch: &str) -> RegistryResult<PreparedBranch> {
        let base = &self.settings.base_branch;

        self.delete_branch(&fork, branch).await;

        let upstream = self.settings.upstream.to_string();
        let (fork_sha, upstream_sha) = tokio::try_join!(
            self.branch_head(&fork.full_name, base),
            self.branch_head(&upstream, base),
        )?;

        if fork_sha != upstream_sha {
            info!(fork = %fork.full_name, from = %fork_sha, to = %upstream_sha, "fast-forwarding fork");
            let url = self
                .client
                .api_url(&format!("/repos/{}/git/refs/heads/{base}", fork.full_name));
            let request = self
                .client
                .request(Method::Patch, url)
                .with_json(json!({ "sha": upstream_sha }));
            self.client.send(request).await?;
        }

        let url = self
            .client
            .api_url(&format!("/repos/{}/git/refs", fork.full_name));
        let request = self.client.request(Method::Post, url).with_json(json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": upstream_sha,
        }));
        self.client.send(request).await?;
        debug!(fork = %fork.full_name, branch, sha = %upstream_sha, "created feature branch");

        let path = format!(
            "/repos/{}/contents/{}?ref={branch}",
            fork.full_name, self.settings.file
        );
        let file: FileContents = self.client.get_json(&path, "registry file").await?;

        Ok(PreparedBranch {
            fork,
            branch: branch.to_string(),
            file_sha: file.sha,
        })
    }

    /// Step 5: appends the plugin to the registry read in step 1 and writes
    /// it to the feature branch.
    ///
    /// The write is guarded by the file sha read from the feature branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be serialized or the write is
    /// rejected (stale sha, missing permission).
    pub async fn commit_entry(
        &self,
        upstream: &UpstreamRegistry,
        prepared: PreparedBranch,
        plugin: &PluginSubmission,
    ) -> RegistryResult<CommittedEntry> {
        let mut index = upstream.index.clone();
        index.push(&plugin.entry)?;

        let url = self.client.api_url(&format!(
            "/repos/{}/contents/{}",
            prepared.fork.full_name, self.settings.file
        ));
        let request = self.client.request(Method::Put, url).with_json(json!({
            "path": self.settings.file,
            "message": format!("Add the {} plugin", plugin.repo),
            "committer": {
                "name": self.settings.committer.name,
                "email": self.settings.committer.email,
            },
            "sha": prepared.file_sha,
            "content": index.to_base64()?,
            "branch": prepared.branch,
        }));
        self.client.send(request).await?;

        info!(fork = %prepared.fork.full_name, branch = %prepared.branch, "committed registry entry");
        Ok(CommittedEntry {
            fork: prepared.fork,
            branch: prepared.branch,
        })
    }

    /// Step 6: opens the pull request against the upstream base branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull request cannot be created.
    pub async fn open_pull_request(
        &self,
        committed: &CommittedEntry,
        plugin: &PluginSubmission,
    ) -> RegistryResult<PullRequest> {
        let url = self
            .client
            .api_url(&format!("/repos/{}/pulls", self.settings.upstream));
        let body = self
            .settings
            .pr_body_template
            .replace("{homepage}", &plugin.entry.homepage);

        let request = self.client.request(Method::Post, url).with_json(json!({
            "title": format!("Add the {} plugin", plugin.repo),
            "head": format!("{}:{}", committed.fork.owner.login, committed.branch),
            "body": body,
            "base": self.settings.base_branch,
            "maintainer_can_modify": true,
        }));
        let pull_request: PullRequest = self.client.send_json(request, "pull request").await?;

        info!(number = pull_request.number, url = ?pull_request.html_url, "opened pull request");
        Ok(pull_request)
    }

    /// Deletes a leftover feature branch. Failures, including the branch
    /// not existing, are ignored.
    async fn delete_branch(&self, fork: &Fork, branch: &str) {
        let url = self
            .client
            .api_url(&format!("/repos/{}/git/refs/heads/{branch}", fork.full_name));
        let request = self.client.request(Method::Delete, url);

        if let Err(err) = self.client.send(request).await {
            debug!(branch, status = ?err.status(), "no previous feature branch to delete");
        }
    }

    async fn branch_head(&self, repo: &str, branch: &str) -> GithubResult<String> {
        let git_ref: GitRef = self
            .client
            .get_json(&format!("/repos/{repo}/git/refs/heads/{branch}"), "branch")
            .await?;
        Ok(git_ref.object.sha)
    }
}
