//! cmap table reading and building

use std::collections::BTreeMap;

use read_fonts::{FontRef, types::Uint24};
use skrifa::{MetadataProvider, charmap::MapVariant};
use write_fonts::tables::cmap::{
    Cmap, Cmap14, CmapSubtable, DefaultUvs, EncodingRecord, NonDefaultUvs, PlatformId,
    UnicodeRange, UvsMapping, VariationSelector,
};

use crate::{
    ComposeError, Result,
    types::{Codepoint, GlyphId, VariationSequence},
};

/// Unicode platform encoding of a format 14 subtable.
const UNICODE_VARIATION_ENCODING: u16 = 5;

/// Glyph of each variation sequence. `None` stands for the base character's
/// default glyph.
pub type Variations = BTreeMap<VariationSequence, Option<GlyphId>>;

/// Read the Unicode mappings of a font, using its best Unicode subtable.
///
/// Mappings to `.notdef` and glyph ids outside `num_glyphs` are dropped.
pub fn read_mappings(font: &FontRef, num_glyphs: u16) -> Vec<(Codepoint, GlyphId)> {
    font.charmap()
        .mappings()
        .filter_map(|(cp, gid)| Some((Codepoint::new(cp), valid_gid(gid, num_glyphs)?)))
        .collect()
}

/// Read the variation sequences of the font's format 14 subtable, if any.
pub fn read_variations(font: &FontRef, num_glyphs: u16) -> Variations {
    font.charmap()
        .variant_mappings()
        .filter_map(|(cp, selector, variant)| {
            let sequence = VariationSequence::new(Codepoint::new(cp), Codepoint::new(selector));
            let glyph = match variant {
                MapVariant::UseDefault => None,
                MapVariant::Variant(gid) => Some(valid_gid(gid, num_glyphs)?),
            };
            Some((sequence, glyph))
        })
        .collect()
}

fn valid_gid(gid: read_fonts::types::GlyphId, num_glyphs: u16) -> Option<GlyphId> {
    let gid = u16::try_from(gid.to_u32()).ok()?;
    (gid != 0 && gid < num_glyphs).then_some(GlyphId::new(gid))
}

/// Build a cmap table from (codepoint, glyph) pairs and variation sequences.
///
/// The table gets a format 4 subtable for the BMP, a format 12 subtable when
/// any mapping lies beyond it, and a format 14 subtable when there are
/// variation sequences.
pub fn build_cmap(
    mappings: impl IntoIterator<Item = (Codepoint, GlyphId)>,
    variations: &Variations,
) -> Result<Cmap> {
    let mappings: Vec<(char, read_fonts::types::GlyphId)> = mappings
        .into_iter()
        .filter_map(|(cp, gid)| Some((cp.to_char()?, gid.to_font())))
        .collect();
    let mut cmap = Cmap::from_mappings(mappings).map_err(|_| ComposeError::CmapBuildError)?;

    if let Some(subtable) = build_cmap14(variations) {
        // Records stay sorted by platform, then encoding.
        let at = cmap
            .encoding_records
            .iter()
            .position(|record| {
                record.platform_id != PlatformId::Unicode
                    || record.encoding_id > UNICODE_VARIATION_ENCODING
            })
            .unwrap_or(cmap.encoding_records.len());
        cmap.encoding_records.insert(
            at,
            EncodingRecord::new(PlatformId::Unicode, UNICODE_VARIATION_ENCODING, subtable),
        );
    }
    Ok(cmap)
}

fn build_cmap14(variations: &Variations) -> Option<CmapSubtable> {
    if variations.is_empty() {
        return None;
    }

    let mut by_selector: BTreeMap<Codepoint, (Vec<Codepoint>, Vec<UvsMapping>)> = BTreeMap::new();
    for (sequence, glyph) in variations {
        let (defaults, mapped) = by_selector.entry(sequence.selector).or_default();
        match glyph {
            None => defaults.push(sequence.base),
            Some(gid) => {
                mapped.push(UvsMapping::new(Uint24::new(sequence.base.to_u32()), gid.to_u16()))
            }
        }
    }

    // Header, then one 11-byte record per selector.
    let mut length = 10 + 11 * by_selector.len() as u32;
    let records: Vec<VariationSelector> = by_selector
        .into_iter()
        .map(|(selector, (defaults, mapped))| {
            let default_uvs = (!defaults.is_empty()).then(|| {
                let ranges = unicode_ranges(&defaults);
                length += 4 + 4 * ranges.len() as u32;
                DefaultUvs::new(ranges.len() as u32, ranges)
            });
            let non_default_uvs = (!mapped.is_empty()).then(|| {
                length += 4 + 5 * mapped.len() as u32;
                NonDefaultUvs::new(mapped.len() as u32, mapped)
            });
            VariationSelector::new(Uint24::new(selector.to_u32()), default_uvs, non_default_uvs)
        })
        .collect();

    Some(CmapSubtable::Format14(Cmap14::new(length, records.len() as u32, records)))
}

/// Collapse ascending code points into runs of at most 256.
fn unicode_ranges(codepoints: &[Codepoint]) -> Vec<UnicodeRange> {
    let mut runs: Vec<(u32, u8)> = Vec::new();
    for cp in codepoints.iter().map(|cp| cp.to_u32()) {
        match runs.last_mut() {
            Some((start, count)) if *count < u8::MAX && *start + u32::from(*count) + 1 == cp => {
                *count += 1
            }
            _ => runs.push((cp, 0)),
        }
    }
    runs.into_iter().map(|(start, count)| UnicodeRange::new(Uint24::new(start), count)).collect()
}
