//! Substitution rule transfer from the donor GSUB into the base

use log::{debug, info, warn};
use read_fonts::types::Tag;

use crate::{
    Result,
    asset::FontAsset,
    reconcile::Reconciliation,
    tables::layout_types::{RuleLookup, SubstRule},
    types::GlyphId,
};

const LIGA: Tag = Tag::new(b"liga");

/// Counts of what [`transfer_rules`] added to the base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub lookups: usize,
    pub rules: usize,
}

/// Whether a feature tag is a stylistic set (`ssNN`) or character variant (`cvNN`).
pub fn is_stylistic_tag(tag: Tag) -> bool {
    let bytes = tag.to_be_bytes();
    (bytes.starts_with(b"ss") || bytes.starts_with(b"cv"))
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
}

/// Replicate donor substitution rules that involve copied glyphs onto the base.
///
/// A rule anchored on a copied glyph is transferred when all its other glyphs
/// resolve in the base; in `liga` lookups every component must itself have
/// been copied. A rule anchored on a glyph that was not copied but that refers
/// to a copied glyph is attached to the base glyph with the anchor's key, if
/// the base has one. Every donor lookup yields at most one base lookup,
/// registered under the donor lookup's feature tags.
pub fn transfer_rules(
    base: &mut FontAsset,
    donor: &FontAsset,
    reconciliation: &Reconciliation,
) -> Result<TransferReport> {
    let mut pending: Vec<(RuleLookup, Vec<Tag>)> = Vec::new();

    for donor_lookup in donor.donor_lookups()? {
        if donor_lookup.tags.iter().any(|tag| is_stylistic_tag(*tag)) {
            debug!("Skip stylistic lookup {} {:?}", donor_lookup.index.as_u16(), donor_lookup.tags);
            continue;
        }
        let is_liga = donor_lookup.tags.contains(&LIGA);

        let base_ref: &FontAsset = base;
        let resolve = |gid: GlyphId| {
            reconciliation
                .gid_map
                .get(&gid)
                .copied()
                .or_else(|| base_ref.resolve_key(donor.glyph(gid)?))
        };

        let mut transferred = RuleLookup::new(donor_lookup.rules.kind, donor_lookup.rules.flag);
        for rule in &donor_lookup.rules.rules {
            if let Some(rule) =
                transfer_rule(rule, is_liga, reconciliation, base_ref, donor, &resolve)
            {
                transferred.rules.push(rule);
            }
        }

        if !transferred.rules.is_empty() {
            debug!(
                "Lookup {} ({:?}): {} rules",
                donor_lookup.index.as_u16(),
                donor_lookup.tags,
                transferred.rules.len()
            );
            pending.push((transferred, donor_lookup.tags));
        }
    }

    let mut report = TransferReport::default();
    for (rules, tags) in pending {
        match rules.to_lookup() {
            Some(lookup) => {
                base.gsub_mut().add_lookup(lookup, &tags);
                report.lookups += 1;
                report.rules += rules.rules.len();
            }
            None => warn!("Dropped an empty {:?} lookup for {tags:?}", rules.kind),
        }
    }

    info!("Transferred {} rules in {} lookups", report.rules, report.lookups);
    Ok(report)
}

fn transfer_rule(
    rule: &SubstRule,
    is_liga: bool,
    reconciliation: &Reconciliation,
    base: &FontAsset,
    donor: &FontAsset,
    resolve: impl Fn(GlyphId) -> Option<GlyphId>,
) -> Option<SubstRule> {
    let anchor = rule.anchor();
    if let Some(base_anchor) = reconciliation.gid_map.get(&anchor) {
        if is_liga && !rule.data().iter().all(|gid| reconciliation.is_copied(*gid)) {
            return None;
        }
        return rule.remap(*base_anchor, &resolve);
    }

    if rule.data().iter().any(|gid| reconciliation.is_copied(*gid)) {
        let base_anchor = base.resolve_key(donor.glyph(anchor)?)?;
        return rule.remap(base_anchor, &resolve);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_stylistic_tag() {
        assert!(is_stylistic_tag(Tag::new(b"ss01")));
        assert!(is_stylistic_tag(Tag::new(b"cv33")));
        assert!(!is_stylistic_tag(Tag::new(b"liga")));
        assert!(!is_stylistic_tag(Tag::new(b"case")));
        assert!(!is_stylistic_tag(Tag::new(b"ssty")));
    }
}
