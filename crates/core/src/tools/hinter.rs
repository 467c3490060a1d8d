use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};
use log::info;

use crate::{config::HINTER, error::BuildError};

/// `Tmp-Regular.ttf` becomes `Tmp-Regular.hinted.ttf`.
pub fn hinted_path(input: &Path) -> PathBuf {
    input.with_extension("hinted.ttf")
}

pub fn command(input: &Path, output: &Path, control_file: &Path) -> Command {
    let mut cmd = Command::new(HINTER);
    cmd.args([
        "--no-info",
        "--ignore-restrictions",
        "--default-script=latn",
        "--fallback-script=none",
        "--fallback-scaling",
    ])
    .arg(format!("--control-file={}", control_file.display()))
    .arg(input)
    .arg(output);
    cmd
}

/// Auto-hint `input` and return the path of the hinted font.
pub fn run(input: &Path, control_file: &Path, style: &str) -> Result<PathBuf> {
    let output = hinted_path(input);
    info!("Hinting {}", input.display());

    let status = command(input, &output, control_file)
        .status()
        .with_context(|| format!("Failed to run {HINTER}"))?;
    if !status.success() {
        return Err(BuildError::ToolFailed { tool: HINTER.to_string(), style: style.to_string() }
            .into());
    }
    Ok(output)
}
