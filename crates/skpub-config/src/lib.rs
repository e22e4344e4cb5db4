//! Configuration management for skpub.
//!
//! This crate loads the optional `skpub.toml` publisher settings and the
//! plugin's `package.json` manifest.

mod error;
mod loader;
mod manifest;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    CONFIG_FILE_NAME, MANIFEST_FILE_NAME, find_and_load_config_from,
    load_config, load_config_or_default, load_manifest, load_manifest_from_dir,
};
pub use manifest::{Author, PluginManifest, RepositoryField, SkpmSection};
pub use schema::{Config, GithubConfig, RegistryConfig};
