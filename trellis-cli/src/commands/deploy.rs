//! Deploy command
//!
//! Streams progress lines while the session runs. Ctrl-C cancels the session
//! at its next wait, and the command still prints everything collected.
//! `--dry-run` walks the generated jobs locally instead of contacting GitHub.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::*;
use tokio::sync::mpsc;
use trellis_core::domain::deployment::{DeploymentReport, LogLevel, Outcome, ProgressEntry};
use trellis_codegen::LintIssue;
use trellis_core::domain::blocks::PipelineBlock;
use trellis_deployer::{CancelToken, DeployRequest, simulate};

use super::generate::{print_issues, render_pipeline};
use crate::config::Config;
use crate::input::{load_pipeline, read_source};

#[derive(Args)]
pub struct DeployArgs {
    /// Block graph JSON file (or a workflow file with --yaml); `-` for stdin
    pub file: PathBuf,

    /// Repository as owner/name
    #[arg(long, env = "TRELLIS_REPO", required_unless_present = "dry_run")]
    pub repo: Option<String>,

    /// GitHub personal access token
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        required_unless_present = "dry_run"
    )]
    pub token: Option<String>,

    /// FILE is already a workflow; publish it as-is
    #[arg(long, conflicts_with = "dry_run")]
    pub yaml: bool,

    /// Simulate the run locally without a repository
    #[arg(long)]
    pub dry_run: bool,

    /// Deploy even if the block graph has lint issues
    #[arg(long)]
    pub skip_lint: bool,

    /// Print the final report as JSON on stdout; progress goes to stderr
    #[arg(long)]
    pub json: bool,
}

/// Stop on lint issues unless `--skip-lint` was given
fn check_lint(issues: &[LintIssue], skip_lint: bool) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    if !skip_lint {
        print_issues(issues, "error:".red().bold());
        bail!(
            "{} lint issue(s) found; fix them or pass --skip-lint",
            issues.len()
        );
    }
    print_issues(issues, "warning:".yellow().bold());
    Ok(())
}

/// Job names in authoring order
fn job_names(pipeline: Option<&PipelineBlock>) -> Vec<String> {
    pipeline
        .map(|p| p.jobs().map(|job| job.name.clone()).collect())
        .unwrap_or_default()
}

pub async fn handle_deploy(args: DeployArgs, config: &Config) -> Result<()> {
    let (workflow, jobs) = if args.yaml {
        (read_source(&args.file)?, Vec::new())
    } else {
        let pipeline = load_pipeline(&args.file)?;
        let (yaml, issues) = render_pipeline(pipeline.as_ref());
        check_lint(&issues, args.skip_lint)?;
        (yaml, job_names(pipeline.as_ref()))
    };

    let cancel = CancelToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEntry>();

    let to_stderr = args.json;
    let printer = tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            print_entry(&entry, to_stderr);
        }
    });

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "Cancelling deployment...".yellow());
                cancel.cancel();
            }
        })
    };

    let report = if args.dry_run {
        simulate(&jobs, &cancel, Some(tx)).await
    } else {
        let (Some(token), Some(repo)) = (args.token, args.repo) else {
            bail!("--repo and --token are required unless --dry-run is given");
        };
        let request = DeployRequest::new(token, repo, workflow)
            .with_cancel(cancel)
            .with_listener(tx);
        config.deployer()?.deploy(request).await
    };

    interrupt.abort();
    // The listener is dropped with the session, which ends the printer
    printer.await.context("Progress printer failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    match report.outcome {
        Outcome::Success => Ok(()),
        Outcome::Failure => bail!("Deployment failed"),
        Outcome::Indeterminate => bail!("Deployment result is unknown; check the Actions tab"),
    }
}

fn print_entry(entry: &ProgressEntry, to_stderr: bool) {
    let time = entry.timestamp.format("%H:%M:%S").to_string().dimmed();
    let message = match entry.level {
        LogLevel::Info => entry.message.normal(),
        LogLevel::Success => entry.message.green(),
        LogLevel::Warning => entry.message.yellow(),
        LogLevel::Error => entry.message.red().bold(),
    };

    if to_stderr {
        eprintln!("{} {}", time, message);
    } else {
        println!("{} {}", time, message);
    }
}

fn print_summary(report: &DeploymentReport) {
    let outcome = match report.outcome {
        Outcome::Success => "success".green().bold(),
        Outcome::Failure => "failure".red().bold(),
        Outcome::Indeterminate => "indeterminate".yellow().bold(),
    };

    println!();
    println!("{} {}", "Outcome:".bold(), outcome);
    println!("{} {}", "Session:".bold(), report.session_id);
    if let Some(url) = &report.run_url {
        println!("{} {}", "Run:".bold(), url.cyan());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::domain::blocks::JobBlock;

    #[test]
    fn test_job_names_follow_authoring_order() {
        let pipeline = PipelineBlock::new("ci")
            .child(JobBlock::new("test"))
            .child(JobBlock::new("build"));

        assert_eq!(job_names(Some(&pipeline)), vec!["test", "build"]);
        assert!(job_names(None).is_empty());
    }

    #[test]
    fn test_lint_issues_block_unless_skipped() {
        let pipeline = PipelineBlock::new("ci").child(JobBlock::new("test").needs("missing"));
        let (_, issues) = render_pipeline(Some(&pipeline));

        assert!(!issues.is_empty());
        assert!(check_lint(&issues, false).is_err());
        assert!(check_lint(&issues, true).is_ok());
        assert!(check_lint(&[], false).is_ok());
    }
}
