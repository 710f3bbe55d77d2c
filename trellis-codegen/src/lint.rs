//! Structural checks for a block graph
//!
//! The renderer emits whatever it's given. These checks catch the mistakes
//! GitHub would otherwise reject after the workflow has been committed.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use trellis_core::domain::blocks::PipelineBlock;

/// A structural problem in a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintIssue {
    #[error("job #{position} has no name")]
    EmptyJobName { position: usize },

    #[error("job '{0}' is defined more than once")]
    DuplicateJob(String),

    #[error("job '{job}' needs '{need}', which is not defined in this pipeline")]
    UnknownNeed { job: String, need: String },

    #[error("job '{0}' depends on itself")]
    SelfDependency(String),

    #[error("jobs form a dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("step #{position} of job '{job}' has no name")]
    EmptyStepName { job: String, position: usize },
}

/// Check job names and `needs` references
///
/// Returns every issue found, in authoring order.
pub fn validate(pipeline: &PipelineBlock) -> Result<(), Vec<LintIssue>> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (position, job) in pipeline.jobs().enumerate() {
        if job.name.trim().is_empty() {
            issues.push(LintIssue::EmptyJobName {
                position: position + 1,
            });
        } else if !seen.insert(job.name.as_str()) {
            issues.push(LintIssue::DuplicateJob(job.name.clone()));
        }

        for (step_position, step) in job.steps().enumerate() {
            if step.name.trim().is_empty() {
                issues.push(LintIssue::EmptyStepName {
                    job: job.name.clone(),
                    position: step_position + 1,
                });
            }
        }
    }

    for job in pipeline.jobs() {
        for need in &job.needs {
            if need == &job.name {
                issues.push(LintIssue::SelfDependency(job.name.clone()));
            } else if !seen.contains(need.as_str()) {
                issues.push(LintIssue::UnknownNeed {
                    job: job.name.clone(),
                    need: need.clone(),
                });
            }
        }
    }

    if let Some(cycle) = find_cycle(pipeline) {
        issues.push(LintIssue::DependencyCycle(cycle));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over `needs` edges, ignoring self-edges and dangling
/// references (reported separately)
fn find_cycle(pipeline: &PipelineBlock) -> Option<Vec<String>> {
    let edges: HashMap<&str, Vec<&str>> = pipeline
        .jobs()
        .map(|job| {
            let needs = job
                .needs
                .iter()
                .map(String::as_str)
                .filter(|need| *need != job.name)
                .collect();
            (job.name.as_str(), needs)
        })
        .collect();

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();

    for job in pipeline.jobs() {
        if let Some(cycle) = visit(job.name.as_str(), &edges, &mut marks, &mut path) {
            return Some(cycle);
        }
    }

    None
}

fn visit<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(node) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        None => {}
    }

    let needs = edges.get(node)?;

    marks.insert(node, Mark::Visiting);
    path.push(node);

    for &need in needs {
        if let Some(cycle) = visit(need, edges, marks, path) {
            return Some(cycle);
        }
    }

    path.pop();
    marks.insert(node, Mark::Done);
    None
}
