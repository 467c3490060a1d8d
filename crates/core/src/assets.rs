//! Locations of the source assets and the existence check that guards a build.

use std::path::{Path, PathBuf};

use log::error;

use crate::{
    config::{BASE_FONT, DONOR_FONT, FEATURE_GLYPHS, ITALIC_ARTWORK_DIR, ITALIC_GLYPHS, PATCHER_SCRIPT},
    error::BuildError,
    style::{StyleConfig, Weight},
};

/// The base and donor fonts of one weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFonts {
    pub base: PathBuf,
    pub donor: PathBuf,
}

impl SourceFonts {
    pub fn new(src_dir: &Path, weight: Weight) -> Self {
        Self {
            base: src_dir.join(format!("{BASE_FONT}-{weight}.ttf")),
            donor: src_dir.join(format!("{DONOR_FONT}-{weight}.ttf")),
        }
    }
}

/// `src/italic/{weight}/{glyph}.svg`
pub fn italic_artwork(src_dir: &Path, weight: Weight, glyph: &str) -> PathBuf {
    src_dir.join(ITALIC_ARTWORK_DIR).join(weight.as_str()).join(format!("{glyph}.svg"))
}

/// `src/{tag}/{weight}/{glyph}.{tag}.svg`
pub fn feature_artwork(src_dir: &Path, tag: &str, weight: Weight, glyph: &str) -> PathBuf {
    src_dir.join(tag).join(weight.as_str()).join(format!("{glyph}.{tag}.svg"))
}

pub fn patcher_script(src_dir: &Path) -> PathBuf {
    src_dir.join(PATCHER_SCRIPT)
}

/// Every file the build of `style` reads from `src_dir`.
pub fn required_assets(src_dir: &Path, style: &StyleConfig) -> Vec<PathBuf> {
    let weight = style.weight();
    let sources = SourceFonts::new(src_dir, weight);
    let mut paths = vec![sources.base, sources.donor];

    if style.italic {
        paths.extend(ITALIC_GLYPHS.iter().map(|glyph| italic_artwork(src_dir, weight, glyph)));
    }
    for (tag, glyphs) in FEATURE_GLYPHS {
        paths.extend(glyphs.iter().map(|glyph| feature_artwork(src_dir, tag, weight, glyph)));
    }
    if style.nerd {
        paths.push(patcher_script(src_dir));
    }
    paths
}

/// Fail with [`BuildError::MissingAssets`] unless every path exists.
///
/// Each missing path is logged before the error is returned.
pub fn required<P: AsRef<Path>>(
    target: &str,
    paths: impl IntoIterator<Item = P>,
) -> Result<(), BuildError> {
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| !path.as_ref().exists())
        .map(|path| path.as_ref().to_path_buf())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    for path in &missing {
        error!("file not found: \"{}\"", path.display());
    }
    Err(BuildError::MissingAssets { target: target.to_string(), paths: missing })
}
