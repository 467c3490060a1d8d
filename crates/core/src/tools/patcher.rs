use std::{
    io::{BufRead, BufReader, Read, Write, stdout},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use log::info;

use super::DiagnosticGuard;
use crate::{config::FONTFORGE, error::BuildError};

pub fn command(script: &Path, input: &Path, out_dir: &Path) -> Command {
    let mut cmd = Command::new(FONTFORGE);
    cmd.args(["-quiet", "-script"])
        .arg(script)
        .arg(input)
        .args(["--complete", "--careful", "-out"])
        .arg(out_dir);
    cmd
}

/// Extract the generated font path from the patcher's last line, e.g. `\===> 'tmp/x.ttf'`.
pub fn parse_patcher_output(line: &str) -> Result<PathBuf, BuildError> {
    match line.split('\'').nth(1) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(BuildError::PatcherOutput { line: line.to_string() }),
    }
}

/// Patch `input` with the icon glyphs and return the path of the patched font.
///
/// The patcher's stdout is echoed on one line as progress.
pub fn run(
    script: &Path,
    input: &Path,
    out_dir: &Path,
    style: &str,
    suppress_errors: bool,
) -> Result<PathBuf> {
    info!("Patching {}", input.display());
    let guard = DiagnosticGuard::new(suppress_errors);

    let mut child = command(script, input, out_dir)
        .stdout(Stdio::piped())
        .stderr(guard.stderr())
        .spawn()
        .with_context(|| format!("Failed to run {FONTFORGE}"))?;
    let output = child.stdout.take().context("Patcher stdout is not captured")?;

    let last_line = stream_progress(output);
    let status = child.wait().with_context(|| format!("Failed to wait for {FONTFORGE}"))?;
    println!();

    if !status.success() {
        return Err(BuildError::ToolFailed { tool: "patcher".to_string(), style: style.to_string() }
            .into());
    }
    let last_line = last_line?.unwrap_or_default();
    Ok(parse_patcher_output(&last_line)?)
}

fn stream_progress(output: impl Read) -> Result<Option<String>> {
    let mut out = stdout().lock();
    let mut last_line = None;
    for line in BufReader::new(output).lines() {
        let line = line.context("Failed to read patcher output")?;
        write!(out, "\r\x1b[2K| {}", line.trim_end())?;
        out.flush()?;
        last_line = Some(line);
    }
    Ok(last_line)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn test_parse_patcher_output() {
        let path =
            parse_patcher_output("    \\===> 'tmp/TmpNerdFont-Regular.ttf'").unwrap();
        assert_eq!(path, PathBuf::from("tmp/TmpNerdFont-Regular.ttf"));
    }

    #[test]
    fn test_parse_patcher_output_without_path() {
        for line in ["Done", "", "''"] {
            match parse_patcher_output(line) {
                Err(BuildError::PatcherOutput { line: reported }) => assert_eq!(reported, line),
                other => panic!("unexpected result for {line:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_stream_progress_keeps_last_line() {
        let output = b"Patching glyphs\nAdding icons\n\\===> 'tmp/a.ttf'\n".as_slice();
        let last = stream_progress(output).unwrap();
        assert_eq!(last.as_deref(), Some("\\===> 'tmp/a.ttf'"));
    }

    #[test]
    fn test_command_arguments() {
        let cmd = command(
            Path::new("src/FontPatcher/font-patcher"),
            Path::new("tmp/Tmp-Regular.hinted.ttf"),
            Path::new("tmp"),
        );
        assert_eq!(cmd.get_program(), OsStr::new("fontforge"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            [
                "-quiet",
                "-script",
                "src/FontPatcher/font-patcher",
                "tmp/Tmp-Regular.hinted.ttf",
                "--complete",
                "--careful",
                "-out",
                "tmp",
            ]
            .map(OsStr::new)
        );
    }
}
