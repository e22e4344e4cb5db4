//! CLI definition.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Publish plugin releases to GitHub and submit them to the plugin registry.
#[derive(Debug, Parser)]
#[command(name = "skpub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// GitHub token used for every API call
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Plugin directory containing package.json
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a GitHub release, upload the plugin archive and publish it
    Publish(commands::publish::PublishArgs),

    /// Submit the plugin to the plugin registry
    Register(commands::register::RegisterArgs),

    /// Show the GitHub account the token belongs to
    Whoami,
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        let globals = commands::GlobalArgs {
            token: self.token,
            dir: self.dir,
        };

        match self.command {
            Commands::Publish(args) => commands::publish::run(&globals, args),
            Commands::Register(args) => commands::register::run(&globals, &args),
            Commands::Whoami => commands::whoami::run(&globals),
        }
    }
}
