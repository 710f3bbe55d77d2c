//! Block graph to YAML renderer
//!
//! Walks the pipeline depth-first and emits one fixed template per block
//! kind. Children keep their authoring order; blocks that don't belong at a
//! position (or that this renderer doesn't know) are skipped.

use trellis_core::domain::blocks::{
    EnvBlock, JobBlock, PipelineBlock, StepBlock, TriggerBlock, TriggerKind,
};

use crate::yaml::{boolean, flow_list, quoted, scalar};

const INDENT: &str = "  ";

/// Render a pipeline into YAML text
///
/// `None` renders the empty-workspace skeleton: `default_pipeline` with no
/// triggers, jobs or env.
pub fn generate(pipeline: Option<&PipelineBlock>) -> String {
    let default = PipelineBlock::default();
    let pipeline = pipeline.unwrap_or(&default);

    let mut emitter = Emitter::default();
    emitter.pipeline(pipeline);

    tracing::debug!(
        pipeline = %pipeline.name,
        bytes = emitter.out.len(),
        "Generated pipeline YAML"
    );

    emitter.out
}

/// Per-invocation output buffer
#[derive(Default)]
struct Emitter {
    out: String,
}

/// Triggers of one kind merged across blocks
struct TriggerGroup<'a> {
    kind: TriggerKind,
    branches: Vec<&'a str>,
    crons: Vec<&'a str>,
}

impl Emitter {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn pipeline(&mut self, pipeline: &PipelineBlock) {
        self.line(0, &format!("name: {}", scalar(&pipeline.name)));
        self.line(0, &format!("concurrent: {}", boolean(pipeline.concurrent)));
        self.blank();

        let triggers: Vec<&TriggerBlock> = pipeline.triggers().collect();
        self.triggers(&triggers);
        self.blank();

        let jobs: Vec<&JobBlock> = pipeline.jobs().collect();
        if jobs.is_empty() {
            self.line(0, "jobs: {}");
        } else {
            self.line(0, "jobs:");
            for job in jobs {
                self.job(job);
            }
        }
        self.blank();

        let env: Vec<&EnvBlock> = pipeline.env().collect();
        if env.is_empty() {
            self.line(0, "env: {}");
        } else {
            self.line(0, "env:");
            for var in env {
                self.line(1, &format!("{}: {}", scalar(&var.key), quoted(&var.value)));
            }
        }
    }

    fn triggers(&mut self, triggers: &[&TriggerBlock]) {
        let groups = group_triggers(triggers);
        if groups.is_empty() {
            self.line(0, "on: {}");
            return;
        }

        self.line(0, "on:");
        for group in groups {
            let key = group.kind.as_str();
            match group.kind {
                TriggerKind::Push | TriggerKind::PullRequest => {
                    if group.branches.is_empty() {
                        self.line(1, &format!("{}: {{}}", key));
                    } else {
                        self.line(1, &format!("{}:", key));
                        self.line(2, &format!("branches: {}", flow_list(group.branches)));
                    }
                }
                TriggerKind::Schedule => {
                    self.line(1, &format!("{}:", key));
                    for cron in group.crons {
                        self.line(2, &format!("- cron: {}", quoted(cron)));
                    }
                }
                TriggerKind::WorkflowDispatch => {
                    self.line(1, &format!("{}: {{}}", key));
                }
            }
        }
    }

    fn job(&mut self, job: &JobBlock) {
        self.line(1, &format!("{}:", scalar(&job.name)));
        self.line(2, &format!("description: {}", quoted(&job.description)));
        self.line(
            2,
            &format!("continue-on-error: {}", boolean(job.continue_on_error)),
        );
        if let Some(condition) = &job.condition {
            self.line(2, &format!("if: {}", quoted(condition)));
        }

        let steps: Vec<&StepBlock> = job.steps().collect();
        if steps.is_empty() {
            self.line(2, "steps: []");
        } else {
            self.line(2, "steps:");
            for step in steps {
                self.step(step);
            }
        }

        if !job.needs.is_empty() {
            let needs = job.needs.iter().map(String::as_str);
            self.line(2, &format!("needs: {}", flow_list(needs)));
        }
    }

    fn step(&mut self, step: &StepBlock) {
        self.line(3, &format!("- name: {}", scalar(&step.name)));
        if !step.has_inputs() {
            return;
        }

        self.line(4, "with:");
        if let Some(args) = &step.args {
            self.line(5, &format!("args: {}", quoted(args)));
        }
        for input in &step.with {
            self.line(5, &format!("{}: {}", scalar(&input.key), quoted(&input.value)));
        }
    }
}

/// Merge trigger blocks by kind, in order of first appearance
///
/// Two `push` blocks would otherwise produce a duplicate `push:` key. A
/// schedule without any cron expression has nothing to emit and is dropped.
fn group_triggers<'a>(triggers: &[&'a TriggerBlock]) -> Vec<TriggerGroup<'a>> {
    let mut groups: Vec<TriggerGroup<'a>> = Vec::new();

    for &trigger in triggers {
        let Some(kind) = trigger.kind() else {
            tracing::debug!(event = %trigger.event, "Skipping unknown trigger event");
            continue;
        };

        let index = match groups.iter().position(|g| g.kind == kind) {
            Some(index) => index,
            None => {
                groups.push(TriggerGroup {
                    kind,
                    branches: Vec::new(),
                    crons: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];

        for branch in &trigger.branches {
            if !group.branches.contains(&branch.as_str()) {
                group.branches.push(branch.as_str());
            }
        }
        if let Some(cron) = &trigger.cron {
            group.crons.push(cron.as_str());
        }
    }

    groups.retain(|g| g.kind != TriggerKind::Schedule || !g.crons.is_empty());
    groups
}
