//! Register command.

use anyhow::{Context, Result};
use clap::Args;

use skpub_registry::{RegistrySubmitter, SubmissionOutcome};

use super::{GlobalArgs, runtime};
use crate::session::{self, Plugin};

/// Arguments for the register command.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Print the registry entry without calling GitHub
    #[arg(short, long)]
    pub dry_run: bool,
}

/// Runs the register command.
pub fn run(globals: &GlobalArgs, args: &RegisterArgs) -> Result<()> {
    let plugin = Plugin::load(&globals.dir)?;
    let submission = plugin.submission();

    if args.dry_run {
        let entry = serde_json::to_string_pretty(&submission.entry)
            .context("failed to serialize registry entry")?;
        println!("Dry run - would submit to branch {}", submission.branch_name());
        println!();
        println!("{entry}");
        return Ok(());
    }

    let config = session::load_config(&globals.dir)?;
    let client = session::client(&config, globals.token.clone())?;
    let settings = session::registry_settings(&config)?;

    runtime()?.block_on(async {
        println!("Submitting {} to {}...", plugin.repo, settings.upstream);
        let submitter = RegistrySubmitter::new(&client, settings);
        let outcome = submitter
            .submit(&submission)
            .await
            .context("failed to submit plugin to the registry")?;
        report(&outcome);
        Ok::<_, anyhow::Error>(())
    })
}

/// Prints the result of a submission.
pub(super) fn report(outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::AlreadyRegistered => {
            println!("Plugin is already registered, nothing to do.");
        }
        SubmissionOutcome::Submitted(pr) => match &pr.html_url {
            Some(url) => println!("Opened pull request #{} ({url})", pr.number),
            None => println!("Opened pull request #{}", pr.number),
        },
    }
}
