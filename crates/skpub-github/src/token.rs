//! Bearer credential handling.

use std::fmt;

use crate::{GithubError, GithubResult};

/// Placeholder written wherever the credential would otherwise be serialized.
pub const REDACTED_AUTHORIZATION: &str = "Token **********";

/// An opaque GitHub token.
///
/// The value is only reachable through [`Token::authorization`]; `Debug`
/// output is masked so the token cannot leak through logs or error chains.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::NotLoggedIn`] if the token is empty.
    pub fn new(raw: impl Into<String>) -> GithubResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GithubError::NotLoggedIn);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Builds a token from an optional source, such as an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::NotLoggedIn`] if no token is available.
    pub fn from_option(raw: Option<String>) -> GithubResult<Self> {
        raw.map_or(Err(GithubError::NotLoggedIn), Self::new)
    }

    /// Returns the `Authorization` header value.
    pub(crate) fn authorization(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(**********)")
    }
}
