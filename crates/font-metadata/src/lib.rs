//! Final font metadata: naming, language tags, monospace and italic flags.

mod ratio;

use anyhow::{Context, Result};
use firple_font_ops::{build_name_table, name_string, rewrite_font};
use log::debug;
use read_fonts::{FontRef, TableProvider};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        head::{Head, MacStyle},
        hhea::Hhea,
        meta::{DLNG, DataMapRecord, Meta, Metadata, SLNG, ScriptLangTag},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::Fixed,
};

pub use ratio::limit_denominator;

/// Platforms every name record is written for.
pub const NAME_PLATFORMS: &[(u16, u16, u16)] = &[(1, 0, 0), (3, 1, 0x409)];

/// PANOSE family kind: Latin Text.
const PANOSE_FAMILY_TEXT: u8 = 2;

/// Name table contents, IDs 0 to 6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontNames {
    pub copyright: String,
    pub family: String,
    pub subfamily: String,
    pub full_name: String,
    pub postscript_name: String,
    pub version: FontVersion,
}

impl FontNames {
    /// Name records by ID.
    pub fn entries(&self) -> Vec<(u16, String)> {
        vec![
            (0, self.copyright.clone()),
            (1, self.family.clone()),
            (2, self.subfamily.clone()),
            (3, self.version.unique_id(&self.postscript_name)),
            (4, self.full_name.clone()),
            (5, self.version.version_string()),
            (6, self.postscript_name.clone()),
        ]
    }
}

/// Font version information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVersion {
    /// Version tag (e.g., "6.400").
    pub tag: String,
}

impl FontVersion {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Get the version string (e.g., "Version 6.400").
    pub fn version_string(&self) -> String {
        format!("Version {}", self.tag)
    }

    /// Unique font identifier (e.g., "6.400;Firple-Regular").
    pub fn unique_id(&self, postscript_name: &str) -> String {
        format!("{};{postscript_name}", self.tag)
    }

    /// The tag as a `head.fontRevision` value.
    pub fn revision(&self) -> Result<Fixed> {
        let value: f64 =
            self.tag.parse().with_context(|| format!("Invalid version '{}'", self.tag))?;
        Ok(Fixed::from_f64(value))
    }
}

/// Monospace metadata settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonospaceSettings {
    /// Average character width.
    pub width: i16,
    /// PANOSE proportion value (9 = monospace).
    pub panose_proportion: u8,
}

impl MonospaceSettings {
    pub const PROPORTION_MONOSPACED: u8 = 9;

    pub fn new(width: i16) -> Self {
        Self { width, panose_proportion: Self::PROPORTION_MONOSPACED }
    }
}

/// OS/2 coverage bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageRanges {
    pub unicode: [u32; 4],
    pub code_pages: [u32; 2],
}

impl CoverageRanges {
    pub fn read(os2: &read_fonts::tables::os2::Os2) -> Self {
        Self {
            unicode: [
                os2.ul_unicode_range_1(),
                os2.ul_unicode_range_2(),
                os2.ul_unicode_range_3(),
                os2.ul_unicode_range_4(),
            ],
            code_pages: [
                os2.ul_code_page_range_1().unwrap_or(0),
                os2.ul_code_page_range_2().unwrap_or(0),
            ],
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        for (bits, more) in out.unicode.iter_mut().zip(other.unicode) {
            *bits |= more;
        }
        for (bits, more) in out.code_pages.iter_mut().zip(other.code_pages) {
            *bits |= more;
        }
        out
    }
}

/// What the metadata rewrite takes from one source font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub copyright: String,
    pub ranges: CoverageRanges,
    pub x_avg_char_width: i16,
}

impl SourceInfo {
    pub fn read(data: &[u8]) -> Result<Self> {
        let font = FontRef::new(data).context("Failed to parse font")?;
        let os2 = font.os2().context("Font has no OS/2 table")?;
        Ok(Self {
            copyright: name_string(&font, 0).unwrap_or_default(),
            ranges: CoverageRanges::read(&os2),
            x_avg_char_width: os2.x_avg_char_width(),
        })
    }
}

/// Italic style flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItalicSettings {
    /// Slant in degrees, clockwise positive.
    pub angle: f64,
    pub caret_offset: i16,
}

impl ItalicSettings {
    /// Caret slope as (rise, run), from tan(angle) limited to denominator 1000.
    pub fn caret_slope(&self) -> (i16, i16) {
        let (run, rise) = limit_denominator(self.angle.to_radians().tan(), 1000);
        (rise as i16, run as i16)
    }
}

/// Design and supported languages, as ISO 15924 script tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTags {
    pub design: Vec<String>,
    pub supported: Vec<String>,
}

impl LanguageTags {
    fn to_meta(&self) -> Result<Meta> {
        let tags = |values: &[String]| -> Result<Metadata> {
            let tags = values
                .iter()
                .map(|v| ScriptLangTag::new(v.clone()))
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Invalid script tag")?;
            Ok(Metadata::ScriptLangTags(tags))
        };
        Ok(Meta::new(vec![
            DataMapRecord::new(DLNG, tags(&self.design)?),
            DataMapRecord::new(SLNG, tags(&self.supported)?),
        ]))
    }
}

/// Everything the final rewrite writes into a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetadata {
    pub names: FontNames,
    pub languages: LanguageTags,
    pub ranges: CoverageRanges,
    pub monospace: MonospaceSettings,
    pub italic: Option<ItalicSettings>,
}

impl FontMetadata {
    /// Rewrite `data` with this metadata.
    ///
    /// The name table is rebuilt from scratch; `meta` is replaced; OS/2, post,
    /// head and hhea are edited in place.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let revision = self.names.version.revision()?;
        let name = build_name_table(NAME_PLATFORMS, &self.names.entries());
        let meta = self.languages.to_meta()?;

        rewrite_font(data, |font, builder| {
            builder.add_table(&name)?;
            builder.add_table(&meta)?;

            let mut os2: Os2 = font.os2().context("Font has no OS/2 table")?.to_owned_table();
            self.apply_os2(&mut os2);
            builder.add_table(&os2)?;

            let mut post: Post = font.post().context("Font has no post table")?.to_owned_table();
            post.is_fixed_pitch = 1;
            if let Some(italic) = &self.italic {
                post.italic_angle = Fixed::from_f64(-italic.angle);
            }
            builder.add_table(&post)?;

            let mut head: Head = font.head().context("Font has no head table")?.to_owned_table();
            head.font_revision = revision;
            if self.italic.is_some() {
                head.mac_style =
                    MacStyle::from_bits_truncate(head.mac_style.bits() | MacStyle::ITALIC.bits());
            }
            builder.add_table(&head)?;

            if let Some(italic) = &self.italic {
                let mut hhea: Hhea =
                    font.hhea().context("Font has no hhea table")?.to_owned_table();
                let (rise, run) = italic.caret_slope();
                hhea.caret_slope_rise = rise;
                hhea.caret_slope_run = run;
                hhea.caret_offset = italic.caret_offset;
                builder.add_table(&hhea)?;
            }

            debug!("Wrote metadata for {}", self.names.postscript_name);
            Ok(())
        })
    }

    fn apply_os2(&self, os2: &mut Os2) {
        let [r1, r2, r3, r4] = self.ranges.unicode;
        os2.ul_unicode_range_1 = r1;
        os2.ul_unicode_range_2 = r2;
        os2.ul_unicode_range_3 = r3;
        os2.ul_unicode_range_4 = r4;
        os2.ul_code_page_range_1 = Some(self.ranges.code_pages[0]);
        os2.ul_code_page_range_2 = Some(self.ranges.code_pages[1]);

        os2.x_avg_char_width = self.monospace.width;
        os2.panose_10[0] = PANOSE_FAMILY_TEXT;
        os2.panose_10[3] = self.monospace.panose_proportion;

        if self.italic.is_some() {
            let bits = (os2.fs_selection.bits() & !SelectionFlags::REGULAR.bits())
                | SelectionFlags::ITALIC.bits();
            os2.fs_selection = SelectionFlags::from_bits_truncate(bits);
        }
    }
}
