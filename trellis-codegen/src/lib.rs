//! Trellis Code Generator
//!
//! Renders a block graph into a GitHub Actions style YAML pipeline.
//!
//! Rendering is a pure function of the block tree: the same tree always
//! produces byte-identical text. Semantic checks (duplicate jobs, dangling
//! `needs`) live in [`lint`] and are never applied by the renderer itself.
//!
//! # Example
//!
//! ```
//! use trellis_codegen::generate;
//! use trellis_core::domain::blocks::{JobBlock, PipelineBlock, StepBlock};
//!
//! let pipeline = PipelineBlock::new("ci")
//!     .child(JobBlock::new("build").step(StepBlock::new("checkout")));
//!
//! let yaml = generate(Some(&pipeline));
//! assert!(yaml.starts_with("name: ci\n"));
//! ```

mod generator;
pub mod lint;
mod yaml;

pub use generator::generate;
pub use lint::{LintIssue, validate};
