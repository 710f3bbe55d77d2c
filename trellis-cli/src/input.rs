//! Reading block graphs and writing workflows

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use trellis_core::domain::blocks::{PipelineBlock, parse_block_graph};

/// Read a file, or stdin when `path` is `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Load the pipeline of a block graph
///
/// `None` when the graph has no pipeline block.
pub fn load_pipeline(path: &Path) -> Result<Option<PipelineBlock>> {
    let source = read_source(path)?;
    parse_block_graph(&source)
        .with_context(|| format!("{} is not a valid block graph", path.display()))
}

/// Write a workflow to `output`, or stdout when absent
pub fn write_output(output: Option<&Path>, yaml: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", yaml);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn block_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_pipeline() {
        let file = block_file(
            r#"{"type": "pipeline", "name": "ci", "children": [{"type": "job", "name": "build"}]}"#,
        );
        let pipeline = load_pipeline(file.path()).unwrap().unwrap();
        assert_eq!(pipeline.name, "ci");
        assert_eq!(pipeline.jobs().count(), 1);
    }

    #[test]
    fn test_load_empty_graph() {
        let file = block_file("null");
        assert!(load_pipeline(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_graph_names_the_file() {
        let file = block_file("{ not json");
        let err = load_pipeline(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not a valid block graph"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.yml");
        write_output(Some(&path), "name: ci\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "name: ci\n");
    }
}
