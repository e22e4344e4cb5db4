//! Registry entries.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use skpub_config::{Author, PluginManifest};
use skpub_github::RepositoryRef;

static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^<(]+?)?[ \t]*(?:<(?P<email>[^>(]+?)>)?[ \t]*(?:\((?P<url>[^)]+?)\)|$)")
        .expect("invalid regex")
});

/// One plugin in `plugins.json`.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Display title.
    pub title: String,
    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: String,
    /// Sparkle appcast URL.
    pub appcast: String,
    /// Project homepage.
    pub homepage: String,
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl PluginEntry {
    /// Derives the entry for `repo` from its manifest.
    ///
    /// `name` and `owner` always come from the repository, never from the
    /// manifest title.
    #[must_use]
    pub fn from_manifest(manifest: &PluginManifest, repo: &RepositoryRef) -> Self {
        Self {
            title: manifest.title().to_string(),
            description: manifest.description.clone(),
            name: repo.name().to_string(),
            owner: repo.owner().to_string(),
            appcast: format!("https://raw.githubusercontent.com/{repo}/master/.appcast.xml"),
            homepage: manifest
                .homepage
                .clone()
                .unwrap_or_else(|| format!("https://github.com/{repo}")),
            author: manifest.author.as_ref().and_then(author_name),
        }
    }
}

/// Author parsed from `"Name <email> (url)"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

/// Parses a free-text author.
///
/// Every part is optional; text that does not follow the pattern yields an
/// empty identity.
#[must_use]
pub fn parse_author(text: &str) -> AuthorIdentity {
    let Some(captures) = AUTHOR_RE.captures(text.trim()) else {
        return AuthorIdentity::default();
    };

    let part = |group| {
        captures
            .name(group)
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    };

    AuthorIdentity {
        name: part("name"),
        email: part("email"),
        url: part("url"),
    }
}

/// Returns the display name of an author.
#[must_use]
pub fn author_name(author: &Author) -> Option<String> {
    match author {
        Author::Text(text) => parse_author(text).name,
        Author::Person { name, .. } => Some(name.clone()),
    }
}
