//! Subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub mod publish;
pub mod register;
pub mod whoami;

/// Options shared by every subcommand.
#[derive(Debug)]
pub struct GlobalArgs {
    /// Token from `--token` or `GITHUB_TOKEN`.
    pub token: Option<String>,
    /// Plugin directory.
    pub dir: PathBuf,
}

/// Creates the runtime the async API calls run on.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to create async runtime")
}
