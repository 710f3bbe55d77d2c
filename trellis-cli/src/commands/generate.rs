//! Generate command

use std::path::Path;

use anyhow::Result;
use colored::*;
use trellis_codegen::LintIssue;
use trellis_core::domain::blocks::PipelineBlock;

use crate::input::{load_pipeline, write_output};

/// Render the block graph at `input`, returning the YAML and any lint issues
pub fn render(input: &Path) -> Result<(String, Vec<LintIssue>)> {
    let pipeline = load_pipeline(input)?;
    Ok(render_pipeline(pipeline.as_ref()))
}

/// Render an already loaded block graph, with its lint issues
pub fn render_pipeline(pipeline: Option<&PipelineBlock>) -> (String, Vec<LintIssue>) {
    let issues = match pipeline {
        Some(pipeline) => trellis_codegen::validate(pipeline).err().unwrap_or_default(),
        None => Vec::new(),
    };

    (trellis_codegen::generate(pipeline), issues)
}

/// Print lint issues to stderr
pub fn print_issues(issues: &[LintIssue], label: ColoredString) {
    for issue in issues {
        eprintln!("{} {}", label, issue);
    }
}

pub fn handle_generate(input: &Path, output: Option<&Path>) -> Result<()> {
    let (yaml, issues) = render(input)?;
    print_issues(&issues, "warning:".yellow().bold());

    write_output(output, &yaml)?;

    if let Some(path) = output {
        eprintln!("{} {}", "Wrote".green(), path.display());
    }

    Ok(())
}
