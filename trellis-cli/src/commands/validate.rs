//! Validate command

use std::path::Path;

use anyhow::{Result, bail};
use colored::*;

use super::generate::print_issues;
use crate::input::load_pipeline;

pub fn handle_validate(input: &Path) -> Result<()> {
    let Some(pipeline) = load_pipeline(input)? else {
        println!("{}", "No pipeline block found.".yellow());
        return Ok(());
    };

    match trellis_codegen::validate(&pipeline) {
        Ok(()) => {
            println!(
                "{} {} ({} job(s))",
                "✓".green(),
                pipeline.name.bold(),
                pipeline.jobs().count()
            );
            Ok(())
        }
        Err(issues) => {
            print_issues(&issues, "error:".red().bold());
            bail!("{} issue(s) found in {}", issues.len(), input.display())
        }
    }
}
