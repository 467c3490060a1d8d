//! Configuration constants for Firple font builds.

use firple_font_merger::Codepoint;

/// Family name of the generated fonts.
pub const FAMILY: &str = "Firple";

/// Font version, written to the name table and `head.fontRevision`.
pub const VERSION: &str = "6.400";

/// Copyright notice prepended to the source fonts' notices.
pub const COPYRIGHT: &str = "Copyright 2021 negset";

/// Family name that replaces [`FAMILY`] in intermediate files.
pub const TMP_FAMILY: &str = "Tmp";

/// Default source, output and temporary directories.
pub const SRC_DIR: &str = "src";
pub const OUT_DIR: &str = "out";
pub const TMP_DIR: &str = "tmp";

/// Base (Latin monospace) source font file stem.
pub const BASE_FONT: &str = "FiraCode";

/// Donor (Japanese) source font file stem.
pub const DONOR_FONT: &str = "IBMPlexSansJP";

/// Nerd Fonts patcher script, relative to the source directory.
pub const PATCHER_SCRIPT: &str = "FontPatcher/font-patcher";

/// Directory of the italic replacement artwork, relative to the source directory.
pub const ITALIC_ARTWORK_DIR: &str = "italic";

/// Scale applied to donor glyphs before they are fitted to the monospace grid.
pub const PLEX_SCALE: f64 = 2.0;

/// Horizontal scale of the slim family.
pub const SLIM_SCALE: f64 = 0.85;

/// Italic slant in degrees.
pub const ITALIC_SKEW: f64 = 12.0;

/// Horizontal shift applied before the italic slant.
pub const ITALIC_OFFSET: f64 = -100.0;

/// Glyph whose advance defines the half-width cell.
pub const HALF_WIDTH_REFERENCE: Codepoint = Codepoint::new('A' as u32);

/// Base glyphs that are replaced by the donor's (「 and 」).
pub const OVERRIDE_CODEPOINTS: &[Codepoint] = &[Codepoint::new(0x300C), Codepoint::new(0x300D)];

/// Base glyphs replaced by hand-drawn italic artwork.
pub const ITALIC_GLYPHS: &[&str] = &["a", "b", "e", "f", "g", "k", "q"];

/// Supplementary stylistic features and the glyphs each one covers.
pub const FEATURE_GLYPHS: &[(&str, &[&str])] = &[
    ("cv33", &["uni3000"]),
    (
        "ss11",
        &[
            "uni3071", "uni3074", "uni3077", "uni307A", "uni307D", "uni309C", "uni30D1", "uni30D4",
            "uni30D7", "uni30DA", "uni30DD", "uniFF9F",
        ],
    ),
];

/// ISO 15924 scripts the design is made for.
pub const DESIGN_LANGUAGES: &[&str] = &["Hani", "Hira", "Hrkt", "Jpan", "Kana"];

/// ISO 15924 scripts the font supports.
pub const SUPPORTED_LANGUAGES: &[&str] = &["Hani", "Hira", "Hrkt", "Jpan", "Kana", "Latn"];

/// Auto-hinter executable.
pub const HINTER: &str = "ttfautohint";

/// FontForge executable that runs the patcher script.
pub const FONTFORGE: &str = "fontforge";

/// Whether `tag` is one of the supplementary features.
pub fn is_feature_tag(tag: &str) -> bool {
    FEATURE_GLYPHS.iter().any(|(t, _)| *t == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_tags() {
        assert!(is_feature_tag("cv33"));
        assert!(is_feature_tag("ss11"));
        assert!(!is_feature_tag("ss01"));
    }

    #[test]
    fn test_feature_glyph_counts() {
        let counts: Vec<usize> = FEATURE_GLYPHS.iter().map(|(_, names)| names.len()).collect();
        assert_eq!(counts, vec![1, 12]);
    }
}
