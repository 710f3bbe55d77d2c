//! Credential check command

use anyhow::Result;
use colored::*;
use trellis_core::domain::credentials::Credentials;

use crate::config::Config;

pub async fn handle_check_credentials(
    token: &str,
    repo: &str,
    remote: bool,
    config: &Config,
) -> Result<()> {
    let creds = Credentials::validate(token, repo)?;
    println!(
        "{} Token and repository format look valid for {}",
        "✓".green(),
        creds.repo().to_string().bold()
    );

    if !remote {
        return Ok(());
    }

    let deployer = config.deployer()?;
    let repository = deployer.check_connection(token, repo).await?;

    println!(
        "{} Connected to {} (default branch: {})",
        "✓".green(),
        repository
            .full_name
            .unwrap_or_else(|| creds.repo().to_string())
            .bold(),
        repository.default_branch.cyan()
    );

    Ok(())
}
