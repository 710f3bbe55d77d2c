//! Watch command
//!
//! Subscribes to filesystem events for the block graph file and regenerates
//! the workflow once edits have settled for the debounce interval.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::generate::{print_issues, render};
use crate::input::write_output;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// True for writes or creations of the file named `target`
///
/// Editors often save by writing a sibling and renaming it over the
/// original, so the parent directory is watched and events are filtered here.
fn touches(event: &Event, target: &OsStr) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(target))
}

/// Forward change events for `input` into a channel
///
/// Events stop when the returned watcher is dropped.
fn watch_file(input: &Path) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<()>)> {
    let path = std::fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve {}", input.display()))?;
    let target = path
        .file_name()
        .map(|name| name.to_os_string())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let dir = path
        .parent()
        .with_context(|| format!("{} has no parent directory", path.display()))?
        .to_path_buf();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if touches(&event, &target) => {
            tracing::debug!(paths = ?event.paths, "Block graph changed");
            let _ = tx.send(());
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "File watcher error"),
    })
    .context("Failed to start file watcher")?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    tracing::info!(path = %path.display(), "Watching block graph");

    Ok((watcher, rx))
}

/// Wait for a burst of change events followed by `quiet` without any
///
/// Returns false once the channel is closed and drained.
async fn settled(rx: &mut mpsc::UnboundedReceiver<()>, quiet: Duration) -> bool {
    if rx.recv().await.is_none() {
        return false;
    }

    loop {
        match tokio::time::timeout(quiet, rx.recv()).await {
            Ok(Some(())) => continue,
            Ok(None) | Err(_) => return true,
        }
    }
}

fn regenerate(input: &Path, output: Option<&Path>) {
    match render(input).and_then(|(yaml, issues)| {
        print_issues(&issues, "warning:".yellow().bold());
        write_output(output, &yaml)
    }) {
        Ok(()) => {
            let target = output
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string());
            eprintln!("{} {}", "Regenerated".green(), target);
        }
        // Half-saved files are common while editing; keep watching
        Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
    }
}

pub async fn handle_watch(input: &Path, output: Option<&Path>) -> Result<()> {
    let (_watcher, mut changes) = watch_file(input)?;

    eprintln!(
        "{} {} (Ctrl-C to stop)",
        "Watching".bold(),
        input.display()
    );
    regenerate(input, output);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = settled(&mut changes, DEBOUNCE) => {
                if !changed {
                    break;
                }
                regenerate(input, output);
            }
        }
    }

    eprintln!("{}", "Stopped watching.".dimmed());
    Ok(())
}
