//! Configuration and manifest loaders.

use std::path::Path;

use tracing::debug;

use crate::{Config, ConfigError, ConfigResult, PluginManifest};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "skpub.toml";

/// Plugin manifest file name.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Loads configuration from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

/// Finds and loads configuration starting from the given directory.
///
/// Walks up the directory tree until a configuration file is found.
/// Relative start directories are resolved against the current directory
/// first, so `.` still reaches its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found or it cannot be parsed.
pub fn find_and_load_config_from(start_dir: impl AsRef<Path>) -> ConfigResult<Config> {
    let start_dir = std::path::absolute(start_dir.as_ref())?;
    let mut dir = start_dir.as_path();

    loop {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return load_config(config_path);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Err(ConfigError::NotFound(start_dir.join(CONFIG_FILE_NAME)))
}

/// Like [`find_and_load_config_from`], but falls back to defaults when no
/// configuration file exists.
///
/// # Errors
///
/// Returns an error if a configuration file exists but cannot be parsed.
pub fn load_config_or_default(start_dir: impl AsRef<Path>) -> ConfigResult<Config> {
    match find_and_load_config_from(start_dir) {
        Err(ConfigError::NotFound(path)) => {
            debug!(?path, "no configuration file, using defaults");
            Ok(Config::default())
        }
        result => result,
    }
}

/// Loads a plugin manifest from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid manifest.
pub fn load_manifest(path: impl AsRef<Path>) -> ConfigResult<PluginManifest> {
    let path = path.as_ref();
    debug!(?path, "loading plugin manifest");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Loads `package.json` from the given directory.
///
/// # Errors
///
/// Returns an error if the manifest is missing or invalid.
pub fn load_manifest_from_dir(dir: impl AsRef<Path>) -> ConfigResult<PluginManifest> {
    load_manifest(dir.as_ref().join(MANIFEST_FILE_NAME))
}
