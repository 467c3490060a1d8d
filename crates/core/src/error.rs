//! Failure classes of the build pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("missing required files for \"{target}\": {}", display_paths(.paths))]
    MissingAssets { target: String, paths: Vec<PathBuf> },

    #[error("{tool} failed while building {style}")]
    ToolFailed { tool: String, style: String },

    #[error("patcher output does not name a generated font: {line:?}")]
    PatcherOutput { line: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| format!("\"{}\"", p.display())).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_assets_lists_every_path() {
        let err = BuildError::MissingAssets {
            target: "Firple-Regular".to_string(),
            paths: vec![PathBuf::from("src/a.ttf"), PathBuf::from("src/b.svg")],
        };
        assert_eq!(
            err.to_string(),
            "missing required files for \"Firple-Regular\": \"src/a.ttf\", \"src/b.svg\""
        );
    }

    #[test]
    fn test_tool_failed_names_tool_and_style() {
        let err = BuildError::ToolFailed {
            tool: "ttfautohint".to_string(),
            style: "Firple-Bold".to_string(),
        };
        assert_eq!(err.to_string(), "ttfautohint failed while building Firple-Bold");
    }
}
