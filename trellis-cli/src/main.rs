//! Trellis CLI
//!
//! Turns visual pipeline block graphs into GitHub Actions workflows and
//! deploys them to a repository.

mod commands;
mod config;
mod input;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Visual pipeline to GitHub Actions workflow tool", long_about = None)]
struct Cli {
    /// GitHub REST API URL (overrides TRELLIS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries generated YAML
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,trellis_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
    };

    handle_command(cli.command, &config).await
}
