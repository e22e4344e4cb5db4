//! Configuration error types.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration or manifest file not found.
    #[error("file not found: {0}")]
    NotFound(std::path::PathBuf),

    /// Invalid TOML syntax.
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Invalid `package.json`.
    #[error("invalid plugin manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_not_found_display() {
        let err = ConfigError::NotFound(PathBuf::from("/path/to/skpub.toml"));
        assert_eq!(err.to_string(), "file not found: /path/to/skpub.toml");
    }

    #[test]
    fn test_invalid_display() {
        let err = ConfigError::Invalid("registry.repository is empty".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: registry.repository is empty"
        );
    }

    #[test]
    fn test_invalid_manifest_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::from(source);
        assert!(err.to_string().starts_with("invalid plugin manifest:"));
    }
}
