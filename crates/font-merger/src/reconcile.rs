//! Glyph-set reconciliation: decide which donor glyphs join the base and copy them

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
    ComposeError, Result,
    asset::FontAsset,
    glyph_order::GlyphName,
    types::{Codepoint, GlyphId},
};

/// Result of copying donor glyphs into a base asset.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Base names of every glyph that came from the donor, in copy order.
    pub copied: Vec<GlyphName>,
    /// Donor glyph id to base glyph id, for copied glyphs only.
    pub gid_map: BTreeMap<GlyphId, GlyphId>,
}

impl Reconciliation {
    pub fn is_copied(&self, donor_gid: GlyphId) -> bool {
        self.gid_map.contains_key(&donor_gid)
    }
}

/// Why a donor glyph stays out of the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    EncodedInBase,
    NameInBase,
    AltOfExisting,
    StyleSuffix,
}

/// Copy donor glyphs into `base`.
///
/// Glyphs for the `overrides` code points replace the base glyph in place.
/// Other encoded donor glyphs are appended when their primary code point is
/// new to the base; unencoded ones when their name is, unless they are an
/// `alt` form of an existing glyph or carry a donor style suffix.
///
/// Donor variation sequences follow when their base character now shows a
/// copied glyph and their variant glyph, if any, was copied too.
pub fn reconcile(
    base: &mut FontAsset,
    donor: &FontAsset,
    overrides: &[Codepoint],
) -> Result<Reconciliation> {
    let mut result = Reconciliation::default();

    for cp in overrides {
        let donor_gid = donor.gid_by_codepoint(*cp).ok_or(ComposeError::UnmappedCodepoint(*cp))?;
        let base_gid = base.gid_by_codepoint(*cp).ok_or(ComposeError::UnmappedCodepoint(*cp))?;
        let glyph = donor
            .glyph(donor_gid)
            .cloned()
            .ok_or_else(|| ComposeError::MissingGlyph(donor_gid.to_string()))?;
        debug!("Override {cp}: {} replaces {}", glyph.name, base_gid);
        base.replace_glyph(base_gid, glyph)?;
        record(&mut result, base, donor_gid, base_gid);
    }

    let mut skipped = 0usize;
    for (index, glyph) in donor.glyphs().iter().enumerate() {
        let donor_gid = GlyphId::new(index as u16);
        if result.is_copied(donor_gid) {
            continue;
        }
        if let Some(reason) = skip_reason(base, &glyph.name, glyph.codepoints.first()) {
            debug!("Skip {} ({reason:?})", glyph.name);
            skipped += 1;
            continue;
        }
        let base_gid = base.push_glyph(glyph.clone())?;
        record(&mut result, base, donor_gid, base_gid);
    }

    let carried = carry_variations(base, donor, &result)?;
    info!(
        "Copied {} donor glyphs and {carried} variation sequences, skipped {skipped} glyphs",
        result.copied.len()
    );
    Ok(result)
}

fn carry_variations(
    base: &mut FontAsset,
    donor: &FontAsset,
    result: &Reconciliation,
) -> Result<usize> {
    let mut carried = 0;
    for (sequence, variant) in donor.variations() {
        let shown = donor
            .gid_by_codepoint(sequence.base)
            .and_then(|gid| result.gid_map.get(&gid).copied());
        if shown.is_none() || base.gid_by_codepoint(sequence.base) != shown {
            continue;
        }
        let glyph = match variant {
            None => None,
            Some(gid) => match result.gid_map.get(gid) {
                Some(base_gid) => Some(*base_gid),
                None => {
                    debug!("Skip {sequence}: variant {gid} was not copied");
                    continue;
                }
            },
        };
        base.insert_variation(*sequence, glyph)?;
        carried += 1;
    }
    Ok(carried)
}

fn record(result: &mut Reconciliation, base: &FontAsset, donor_gid: GlyphId, base_gid: GlyphId) {
    if let Some(glyph) = base.glyph(base_gid) {
        result.copied.push(glyph.name.clone());
    }
    result.gid_map.insert(donor_gid, base_gid);
}

fn skip_reason(base: &FontAsset, name: &GlyphName, primary: Option<&Codepoint>) -> Option<Skip> {
    if let Some(cp) = primary {
        return base.contains_codepoint(*cp).then_some(Skip::EncodedInBase);
    }
    if base.contains_name(name) {
        return Some(Skip::NameInBase);
    }
    if name.alt_base().is_some_and(|alt_base| base.contains_name(alt_base)) {
        return Some(Skip::AltOfExisting);
    }
    name.has_style_suffix().then_some(Skip::StyleSuffix)
}
