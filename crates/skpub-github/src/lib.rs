//! GitHub API access for skpub.
//!
//! This crate handles:
//! - Authenticated requests with credential redaction
//! - Release creation, asset upload and publishing
//! - Identity and push-permission checks

mod account;
pub mod client;
mod error;
#[cfg(any(test, feature = "test-util"))]
mod mock;
pub mod release;
mod repository;
mod token;

pub use account::User;
pub use client::{
    ApiRequest, ClientSettings, GithubClient, HttpTransport, Method, RequestBody, Transport,
};
pub use error::{GithubError, GithubResult};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
pub use release::{Release, ReleaseAsset, ReleasePublisher};
pub use repository::RepositoryRef;
pub use token::{REDACTED_AUTHORIZATION, Token};
