//! The ttfautohint control file that keeps non-Latin glyphs out of Latin hinting.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use firple_font_merger::{Codepoint, FontAsset, GlyphName};
use log::debug;

/// Latin script blocks, letters only. Digits and punctuation are Common script.
const LATIN_RANGES: &[(u32, u32)] = &[
    (0x0041, 0x005A),
    (0x0061, 0x007A),
    (0x00AA, 0x00AA),
    (0x00BA, 0x00BA),
    (0x00C0, 0x00D6),
    (0x00D8, 0x00F6),
    (0x00F8, 0x024F),
    (0x0250, 0x02AF),
    (0x1D00, 0x1D7F),
    (0x1E00, 0x1EFF),
    (0x2C60, 0x2C7F),
    (0xA720, 0xA7FF),
    (0xAB30, 0xAB6F),
    (0xFB00, 0xFB06),
    (0xFF21, 0xFF3A),
    (0xFF41, 0xFF5A),
];

pub fn is_latin(cp: Codepoint) -> bool {
    let cp = cp.to_u32();
    LATIN_RANGES.iter().any(|(start, end)| (*start..=*end).contains(&cp))
}

/// The code point a glyph name stands for.
///
/// Suffixes after the first `.` are ignored. The glyph of that name in `asset`
/// is consulted first, then the `uniXXXX` and `uXXXX[XX]` conventions.
pub fn codepoint_for_name(asset: &FontAsset, name: &str) -> Option<Codepoint> {
    let base = name.split('.').next().unwrap_or(name);
    if let Some(cp) = asset
        .gid_by_name(base)
        .and_then(|gid| asset.glyph(gid))
        .and_then(|glyph| glyph.codepoints.first())
    {
        return Some(*cp);
    }
    parse_codepoint_name(base)
}

fn parse_codepoint_name(name: &str) -> Option<Codepoint> {
    let hex = if let Some(rest) = name.strip_prefix("uni") {
        rest.get(..4)?
    } else if let Some(rest) = name.strip_prefix('u') {
        (4..=6).contains(&rest.len()).then_some(rest)?
    } else {
        return None;
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().filter(|cp| char::from_u32(*cp).is_some()).map(Codepoint::new)
}

/// The glyphs of `names` that are not Latin script. Unresolvable names count as non-Latin.
pub fn non_latin_glyphs<'a>(
    asset: &FontAsset,
    names: impl IntoIterator<Item = &'a GlyphName>,
) -> Vec<&'a GlyphName> {
    names
        .into_iter()
        .filter(|name| !codepoint_for_name(asset, name).is_some_and(is_latin))
        .collect()
}

/// `none dflt @ a, b, c`, or nothing when there are no glyphs to exclude.
pub fn control_file_contents(glyphs: &[&GlyphName]) -> String {
    if glyphs.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = glyphs.iter().map(|name| name.as_str()).collect();
    format!("none dflt @ {}\n", names.join(", "))
}

pub fn write_control_file<'a>(
    path: &Path,
    asset: &FontAsset,
    names: impl IntoIterator<Item = &'a GlyphName>,
) -> Result<()> {
    let glyphs = non_latin_glyphs(asset, names);
    debug!("Excluding {} glyphs from Latin hinting", glyphs.len());
    fs::write(path, control_file_contents(&glyphs))
        .with_context(|| format!("Failed to write control file: {}", path.display()))
}
