//! Repository references.

use std::fmt;
use std::str::FromStr;

use crate::GithubError;

/// A GitHub repository identified by `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Returns the owning user or organization.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = GithubError;

    /// Parses `owner/name`, `github:owner/name`, or a GitHub HTTPS/SSH URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GithubError::InvalidRepository(s.to_string());

        let trimmed = s.trim().trim_end_matches('/');
        let path = ["https://github.com/", "git+https://github.com/", "git@github.com:", "github:"]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        let path = path.trim_end_matches(".git");

        let mut parts = path.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        if owner.is_empty() || name.is_empty() || owner.contains(':') {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}
