mod checks;
mod commands;
mod config;
mod context;
mod environment;
mod git;
mod logging;
mod output;
mod platform;
mod remediation;
mod traits;
mod version;

#[cfg(test)]
mod test_helpers;

use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use commands::{CommandStatus, InitCommand, TagCreateCommand, TagStatusCommand};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgeops")]
#[command(about = "Validate, release and inspect edge worker deployments", long_about = None)]
#[command(version)]
struct Cli {
    /// Working tree to operate on (defaults to current directory)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check tools, repository, authentication, files and workers
    Init,

    /// Manage release tags
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Create and push a release tag for qa or prod
    Create,

    /// Show what each environment is running
    Status,
}

fn run(cli: Cli) -> Result<CommandStatus> {
    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };
    tracing::debug!(root = %root.display(), "working tree");

    let ctx = Context::new(root);

    match cli.command {
        Commands::Init => InitCommand::execute(&ctx),
        Commands::Tag { command } => match command {
            TagCommands::Create => TagCreateCommand::execute(&ctx),
            TagCommands::Status => TagStatusCommand::execute(&ctx),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            output::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
