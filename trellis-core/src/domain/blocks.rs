//! Block graph domain types
//!
//! The visual editor hands over its workspace as a tree of typed blocks.
//! Each block kind is a variant of [`BlockNode`]; unknown kinds survive
//! deserialization as [`BlockNode::Unknown`] so half-built workspaces can
//! still be rendered.

use serde::{Deserialize, Serialize};

/// Pipeline name used when the workspace has no pipeline block
pub const DEFAULT_PIPELINE_NAME: &str = "default_pipeline";

/// A single block in the editor workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockNode {
    Pipeline(PipelineBlock),
    Job(JobBlock),
    Step(StepBlock),
    Trigger(TriggerBlock),
    Env(EnvBlock),
    /// Any block kind this crate doesn't know about
    #[serde(other)]
    Unknown,
}

/// Root block of a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineBlock {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    #[serde(default)]
    pub concurrent: bool,
    /// Jobs, triggers and env blocks in authoring order
    #[serde(default)]
    pub children: Vec<BlockNode>,
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

impl Default for PipelineBlock {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            concurrent: false,
            children: Vec::new(),
        }
    }
}

impl PipelineBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Appends a child block, keeping authoring order
    pub fn child(mut self, node: impl Into<BlockNode>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Job blocks in authoring order
    pub fn jobs(&self) -> impl Iterator<Item = &JobBlock> + '_ {
        self.children.iter().filter_map(|node| match node {
            BlockNode::Job(job) => Some(job),
            _ => None,
        })
    }

    /// Trigger blocks in authoring order
    pub fn triggers(&self) -> impl Iterator<Item = &TriggerBlock> + '_ {
        self.children.iter().filter_map(|node| match node {
            BlockNode::Trigger(trigger) => Some(trigger),
            _ => None,
        })
    }

    /// Environment variable blocks in authoring order
    pub fn env(&self) -> impl Iterator<Item = &EnvBlock> + '_ {
        self.children.iter().filter_map(|node| match node {
            BlockNode::Env(env) => Some(env),
            _ => None,
        })
    }
}

/// A job block and its nested steps
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub continue_on_error: bool,
    /// Names of jobs this one waits for
    #[serde(default)]
    pub needs: Vec<String>,
    /// Conditional expression rendered as the job's `if:`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub children: Vec<BlockNode>,
}

impl JobBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn needs(mut self, job: impl Into<String>) -> Self {
        self.needs.push(job.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn step(mut self, step: StepBlock) -> Self {
        self.children.push(BlockNode::Step(step));
        self
    }

    pub fn child(mut self, node: impl Into<BlockNode>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Step blocks in authoring order
    pub fn steps(&self) -> impl Iterator<Item = &StepBlock> + '_ {
        self.children.iter().filter_map(|node| match node {
            BlockNode::Step(step) => Some(step),
            _ => None,
        })
    }
}

/// A step inside a job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepBlock {
    #[serde(default)]
    pub name: String,
    /// Rendered as `with.args`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    /// Extra `with:` inputs, rendered after `args`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<StepInput>,
}

impl StepBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn args(mut self, args: impl Into<String>) -> Self {
        self.args = Some(args.into());
        self
    }

    pub fn input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with.push(StepInput {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn has_inputs(&self) -> bool {
        self.args.is_some() || !self.with.is_empty()
    }
}

/// One `with:` entry of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub key: String,
    pub value: String,
}

/// Event that starts the pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerBlock {
    /// Raw event name as authored
    pub event: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

/// Trigger events the generator knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Push,
    PullRequest,
    Schedule,
    WorkflowDispatch,
}

impl TriggerKind {
    /// Key used under `on:`
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Push => "push",
            TriggerKind::PullRequest => "pull_request",
            TriggerKind::Schedule => "schedule",
            TriggerKind::WorkflowDispatch => "workflow_dispatch",
        }
    }
}

impl TriggerBlock {
    pub fn push(branches: &[&str]) -> Self {
        Self {
            event: "push".to_string(),
            branches: branches.iter().map(|b| b.to_string()).collect(),
            cron: None,
        }
    }

    pub fn pull_request(branches: &[&str]) -> Self {
        Self {
            event: "pull_request".to_string(),
            branches: branches.iter().map(|b| b.to_string()).collect(),
            cron: None,
        }
    }

    pub fn schedule(cron: impl Into<String>) -> Self {
        Self {
            event: "schedule".to_string(),
            branches: Vec::new(),
            cron: Some(cron.into()),
        }
    }

    pub fn manual() -> Self {
        Self {
            event: "workflow_dispatch".to_string(),
            ..Self::default()
        }
    }

    /// Resolves the authored event name, `None` for unrecognised events
    pub fn kind(&self) -> Option<TriggerKind> {
        match self.event.as_str() {
            "push" => Some(TriggerKind::Push),
            "pull_request" => Some(TriggerKind::PullRequest),
            "schedule" => Some(TriggerKind::Schedule),
            "workflow_dispatch" | "manual" => Some(TriggerKind::WorkflowDispatch),
            _ => None,
        }
    }
}

/// Pipeline-level environment variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvBlock {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl EnvBlock {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<JobBlock> for BlockNode {
    fn from(job: JobBlock) -> Self {
        BlockNode::Job(job)
    }
}

impl From<StepBlock> for BlockNode {
    fn from(step: StepBlock) -> Self {
        BlockNode::Step(step)
    }
}

impl From<TriggerBlock> for BlockNode {
    fn from(trigger: TriggerBlock) -> Self {
        BlockNode::Trigger(trigger)
    }
}

impl From<EnvBlock> for BlockNode {
    fn from(env: EnvBlock) -> Self {
        BlockNode::Env(env)
    }
}

/// Parse the editor's JSON export into the root pipeline block
///
/// Accepts `null` (empty workspace), a single pipeline block, or a list of
/// top-level blocks (the first pipeline block wins). Anything else yields
/// `Ok(None)`.
pub fn parse_block_graph(json: &str) -> serde_json::Result<Option<PipelineBlock>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let nodes = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<BlockNode>>>()?,
        other => vec![serde_json::from_value(other)?],
    };

    Ok(nodes.into_iter().find_map(|node| match node {
        BlockNode::Pipeline(pipeline) => Some(pipeline),
        _ => None,
    }))
}
