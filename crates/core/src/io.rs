//! Font file I/O and scratch directory handling.

use std::{
    collections::BTreeSet,
    fs::{create_dir_all, read, read_dir, remove_dir_all, remove_file, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;
use log::{debug, warn};

#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Write `data`, creating the parent directory first.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data)
            .with_context(|| format!("Failed to write font: {}", self.path.display()))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn glob_fonts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    Ok(glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .collect())
}

/// The directory of intermediate files, cleaned up on drop unless kept.
///
/// A directory created by this run is removed entirely. An existing one only
/// loses the entries added after it was opened.
#[derive(Debug)]
pub struct TmpDir {
    path: PathBuf,
    keep: bool,
    /// Entries present before this run, `None` when the directory is ours.
    existing: Option<BTreeSet<PathBuf>>,
}

impl TmpDir {
    pub fn create(path: impl Into<PathBuf>, keep: bool) -> Result<Self> {
        let path = path.into();
        let existing = if path.is_dir() { Some(list_entries(&path)?) } else { None };
        create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(Self { path, keep, existing })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    fn remove_added(&self, existing: &BTreeSet<PathBuf>) -> Result<()> {
        for entry in list_entries(&self.path)?.difference(existing) {
            let removed = if entry.is_dir() { remove_dir_all(entry) } else { remove_file(entry) };
            removed.with_context(|| format!("Failed to remove {}", entry.display()))?;
        }
        Ok(())
    }
}

fn list_entries(dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let entries =
        read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    Ok(entries.filter_map(Result::ok).map(|entry| entry.path()).collect())
}

impl Drop for TmpDir {
    fn drop(&mut self) {
        if self.keep {
            debug!("Keeping temporary files in {}", self.path.display());
            return;
        }
        let result = match &self.existing {
            None => remove_dir_all(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
            Some(existing) => self.remove_added(existing),
        };
        if let Err(e) = result {
            warn!("{e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_file_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = FontFile::new(dir.path().join("nested/out/Firple-Regular.ttf"));
        file.write(b"data").unwrap();
        assert_eq!(file.read().unwrap(), b"data");
    }

    #[test]
    fn test_font_file_read_error_names_path() {
        let err = FontFile::new("/nonexistent/Firple.ttf").read().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/Firple.ttf"));
    }

    #[test]
    fn test_glob_fonts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Firple-Regular.ttf", "Firple-Bold.ttf", "notes.txt"] {
            write(dir.path().join(name), b"").unwrap();
        }
        assert_eq!(glob_fonts(dir.path(), "*.ttf").unwrap().len(), 2);
    }

    #[test]
    fn test_tmp_dir_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp");
        {
            let tmp = TmpDir::create(&path, false).unwrap();
            write(tmp.join("Tmp-Regular.ttf"), b"").unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_tmp_dir_existing_keeps_prior_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("precious.ttf"), b"keep").unwrap();
        {
            let tmp = TmpDir::create(dir.path(), false).unwrap();
            write(tmp.join("Tmp-Regular.ttf"), b"").unwrap();
            write(tmp.join("Firple-Regular-control.txt"), b"").unwrap();
        }
        assert!(dir.path().exists());
        assert_eq!(read(dir.path().join("precious.ttf")).unwrap(), b"keep");
        assert!(!dir.path().join("Tmp-Regular.ttf").exists());
        assert!(!dir.path().join("Firple-Regular-control.txt").exists());
    }

    #[test]
    fn test_tmp_dir_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp");
        drop(TmpDir::create(&path, true).unwrap());
        assert!(path.exists());
    }
}
