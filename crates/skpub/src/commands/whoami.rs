//! Whoami command.

use anyhow::{Context, Result};

use super::{GlobalArgs, runtime};
use crate::session;

/// Runs the whoami command.
pub fn run(globals: &GlobalArgs) -> Result<()> {
    let config = session::load_config(&globals.dir)?;
    let client = session::client(&config, globals.token.clone())?;

    let user = runtime()?
        .block_on(client.get_user())
        .context("failed to fetch the authenticated user")?;

    match user.name {
        Some(name) => println!("{} ({name})", user.login),
        None => println!("{}", user.login),
    }

    Ok(())
}
