//! Plugin manifest (`package.json`).

use serde::Deserialize;

/// The subset of `package.json` skpub reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Package name.
    pub name: String,

    /// Package version.
    #[serde(default)]
    pub version: Option<semver::Version>,

    /// One-line description.
    #[serde(default)]
    pub description: Option<String>,

    /// Project homepage.
    #[serde(default)]
    pub homepage: Option<String>,

    /// Author, either `"Name <email> (url)"` or an object.
    #[serde(default)]
    pub author: Option<Author>,

    /// Source repository.
    #[serde(default)]
    pub repository: Option<RepositoryField>,

    /// Plugin-specific overrides.
    #[serde(default)]
    pub skpm: SkpmSection,
}

/// The `skpm` section of `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkpmSection {
    /// Plugin name, when it differs from the package name.
    #[serde(default)]
    pub name: Option<String>,

    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,

    /// Name of the built `.sketchplugin` bundle.
    #[serde(default)]
    pub main: Option<String>,
}

/// The `author` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Author {
    /// Free text such as `"Jane Doe <jane@example.com> (https://jane.dev)"`.
    Text(String),
    /// Structured author.
    Person {
        name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

/// The `repository` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RepositoryField {
    /// `"owner/name"` or a URL.
    Short(String),
    /// `{ "type": "git", "url": "..." }`.
    Object { url: String },
}

impl PluginManifest {
    /// Returns the plugin name, preferring `skpm.name`.
    #[must_use]
    pub fn plugin_name(&self) -> &str {
        self.skpm.name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the registry title, falling back to the plugin name.
    #[must_use]
    pub fn title(&self) -> &str {
        self.skpm.title.as_deref().unwrap_or_else(|| self.plugin_name())
    }

    /// Returns the raw repository string, if declared.
    #[must_use]
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_ref().map(|repository| match repository {
            RepositoryField::Short(value) | RepositoryField::Object { url: value } => {
                value.as_str()
            }
        })
    }

    /// Returns the `.sketchplugin` bundle name.
    #[must_use]
    pub fn bundle_name(&self) -> String {
        self.skpm
            .main
            .clone()
            .unwrap_or_else(|| format!("{}.sketchplugin", self.plugin_name()))
    }
}
