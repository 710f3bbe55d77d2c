//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod credentials;
mod deploy;
mod generate;
mod validate;
mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Render a block graph as a GitHub Actions workflow
    Generate {
        /// Block graph JSON file, or `-` for stdin
        input: PathBuf,

        /// Write the workflow here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check job names and dependencies of a block graph
    Validate {
        /// Block graph JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Regenerate the workflow whenever the block graph changes
    Watch {
        /// Block graph JSON file
        input: PathBuf,

        /// Write the workflow here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a token and repository, optionally against GitHub
    CheckCredentials {
        /// Repository as owner/name
        #[arg(long, env = "TRELLIS_REPO")]
        repo: String,

        /// GitHub personal access token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// Also confirm the repository is reachable
        #[arg(long)]
        remote: bool,
    },
    /// Commit the workflow to a repository, run it and report the result
    Deploy(deploy::DeployArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate { input, output } => {
            generate::handle_generate(&input, output.as_deref())
        }
        Commands::Validate { input } => validate::handle_validate(&input),
        Commands::Watch { input, output } => watch::handle_watch(&input, output.as_deref()).await,
        Commands::CheckCredentials {
            repo,
            token,
            remote,
        } => credentials::handle_check_credentials(&token, &repo, remote, config).await,
        Commands::Deploy(args) => deploy::handle_deploy(args, config).await,
    }
}
