//! Types for editable layout tables (GSUB/GPOS) and substitution rules
//!
//! These types encapsulate the state of a layout table while the pipeline
//! edits it, replacing raw HashMaps and Vecs.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use read_fonts::types::Tag;
use write_fonts::tables::{
    gsub::{
        AlternateSet, AlternateSubstFormat1, Ligature, LigatureSet, LigatureSubstFormat1,
        MultipleSubstFormat1, Sequence, SingleSubst, SubstitutionLookup,
    },
    layout::{CoverageTable, Lookup, LookupFlag},
};

use crate::types::GlyphId;

/// Index into a lookup list
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookupIndex(pub u16);

impl LookupIndex {
    pub fn new(idx: u16) -> Self {
        Self(idx)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

/// An editable layout table: lookups in list order, plus the feature tags
/// each lookup is registered under.
///
/// Registrations are merged by feature tag and always apply to the default
/// script and language (`DFLT`/`dflt`) when compiled.
#[derive(Debug, Clone)]
pub struct LayoutTable<L> {
    lookups: Vec<L>,
    features: IndexMap<Tag, Vec<LookupIndex>>,
}

impl<L> Default for LayoutTable<L> {
    fn default() -> Self {
        Self { lookups: Vec::new(), features: IndexMap::new() }
    }
}

impl<L> LayoutTable<L> {
    pub fn new(lookups: Vec<L>, features: IndexMap<Tag, Vec<LookupIndex>>) -> Self {
        Self { lookups, features }
    }

    pub fn lookups(&self) -> &[L] {
        &self.lookups
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty() && self.features.is_empty()
    }

    /// Append a lookup and register it under `tags`.
    pub fn add_lookup(&mut self, lookup: L, tags: &[Tag]) -> LookupIndex {
        let index = LookupIndex::new(self.lookups.len() as u16);
        self.lookups.push(lookup);
        for tag in tags {
            self.register(*tag, index);
        }
        index
    }

    /// Register a lookup under a feature tag. Registering twice is a no-op.
    pub fn register(&mut self, tag: Tag, lookup: LookupIndex) {
        let indices = self.features.entry(tag).or_default();
        if !indices.contains(&lookup) {
            indices.push(lookup);
        }
    }

    /// Feature tags a lookup is registered under, in registration order.
    pub fn tags_of(&self, lookup: LookupIndex) -> Vec<Tag> {
        self.features
            .iter()
            .filter(|(_, indices)| indices.contains(&lookup))
            .map(|(tag, _)| *tag)
            .collect()
    }

    pub fn feature_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.features.keys().copied()
    }

    /// Features sorted by tag, each with its lookup indices in ascending order.
    pub fn sorted_features(&self) -> Vec<(Tag, Vec<u16>)> {
        let mut features: Vec<(Tag, Vec<u16>)> = self
            .features
            .iter()
            .map(|(tag, indices)| {
                let mut indices: Vec<u16> = indices.iter().map(|i| i.as_u16()).collect();
                indices.sort_unstable();
                (*tag, indices)
            })
            .collect();
        features.sort_by_key(|(tag, _)| *tag);
        features
    }
}

/// One substitution rule with glyph ids in a single font's glyph space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstRule {
    Single { target: GlyphId, replacement: GlyphId },
    Multiple { target: GlyphId, sequence: Vec<GlyphId> },
    Alternate { target: GlyphId, alternates: Vec<GlyphId> },
    Ligature { ligature: GlyphId, components: Vec<GlyphId> },
}

impl SubstRule {
    /// The glyph the rule is attached to: the trigger, or the ligature glyph.
    pub fn anchor(&self) -> GlyphId {
        match self {
            Self::Single { target, .. }
            | Self::Multiple { target, .. }
            | Self::Alternate { target, .. } => *target,
            Self::Ligature { ligature, .. } => *ligature,
        }
    }

    /// The glyphs the rule refers to besides its anchor: outputs, or ligature components.
    pub fn data(&self) -> &[GlyphId] {
        match self {
            Self::Single { replacement, .. } => std::slice::from_ref(replacement),
            Self::Multiple { sequence, .. } => sequence,
            Self::Alternate { alternates, .. } => alternates,
            Self::Ligature { components, .. } => components,
        }
    }

    /// Rewrite the rule with `anchor` and glyphs resolved by `resolve`.
    ///
    /// Returns `None` when any glyph fails to resolve.
    pub fn remap(
        &self,
        anchor: GlyphId,
        mut resolve: impl FnMut(GlyphId) -> Option<GlyphId>,
    ) -> Option<SubstRule> {
        let data: Option<Vec<GlyphId>> = self.data().iter().map(|gid| resolve(*gid)).collect();
        let data = data?;
        Some(match self {
            Self::Single { .. } => Self::Single { target: anchor, replacement: *data.first()? },
            Self::Multiple { .. } => Self::Multiple { target: anchor, sequence: data },
            Self::Alternate { .. } => Self::Alternate { target: anchor, alternates: data },
            Self::Ligature { .. } => Self::Ligature { ligature: anchor, components: data },
        })
    }
}

/// The rule-bearing lookup types that can be transferred between fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Single,
    Multiple,
    Alternate,
    Ligature,
}

/// A substitution lookup flattened into rules.
#[derive(Debug, Clone)]
pub struct RuleLookup {
    pub kind: RuleKind,
    pub flag: LookupFlag,
    pub rules: Vec<SubstRule>,
}

impl RuleLookup {
    pub fn new(kind: RuleKind, flag: LookupFlag) -> Self {
        Self { kind, flag, rules: Vec::new() }
    }

    /// Build a single-subtable GSUB lookup from the rules.
    ///
    /// When two rules share a coverage glyph the first one wins. Returns
    /// `None` when no rule of the lookup's kind is present.
    pub fn to_lookup(&self) -> Option<SubstitutionLookup> {
        match self.kind {
            RuleKind::Single => {
                let map = first_wins(self.rules.iter().filter_map(|rule| match rule {
                    SubstRule::Single { target, replacement } => Some((*target, *replacement)),
                    _ => None,
                }));
                let (coverage, replacements) = split(map)?;
                let subtable = SingleSubst::format_2(coverage, glyph_ids(&replacements));
                Some(SubstitutionLookup::Single(Lookup::new(self.flag, vec![subtable])))
            }
            RuleKind::Multiple => {
                let map = first_wins(self.rules.iter().filter_map(|rule| match rule {
                    SubstRule::Multiple { target, sequence } => Some((*target, sequence.clone())),
                    _ => None,
                }));
                let (coverage, sequences) = split(map)?;
                let sequences = sequences.iter().map(|seq| Sequence::new(glyph_ids(seq))).collect();
                let subtable = MultipleSubstFormat1::new(coverage, sequences);
                Some(SubstitutionLookup::Multiple(Lookup::new(self.flag, vec![subtable])))
            }
            RuleKind::Alternate => {
                let map = first_wins(self.rules.iter().filter_map(|rule| match rule {
                    SubstRule::Alternate { target, alternates } => {
                        Some((*target, alternates.clone()))
                    }
                    _ => None,
                }));
                let (coverage, sets) = split(map)?;
                let sets = sets.iter().map(|alts| AlternateSet::new(glyph_ids(alts))).collect();
                let subtable = AlternateSubstFormat1::new(coverage, sets);
                Some(SubstitutionLookup::Alternate(Lookup::new(self.flag, vec![subtable])))
            }
            RuleKind::Ligature => {
                let mut by_first: BTreeMap<GlyphId, Vec<Ligature>> = BTreeMap::new();
                for rule in &self.rules {
                    if let SubstRule::Ligature { ligature, components } = rule
                        && let Some((first, rest)) = components.split_first()
                    {
                        by_first
                            .entry(*first)
                            .or_default()
                            .push(Ligature::new(ligature.to_glyph_id16(), glyph_ids(rest)));
                    }
                }
                let (coverage, sets) = split(by_first)?;
                let sets = sets.into_iter().map(LigatureSet::new).collect();
                let subtable = LigatureSubstFormat1::new(coverage, sets);
                Some(SubstitutionLookup::Ligature(Lookup::new(self.flag, vec![subtable])))
            }
        }
    }
}

fn first_wins<V>(pairs: impl Iterator<Item = (GlyphId, V)>) -> BTreeMap<GlyphId, V> {
    let mut map = BTreeMap::new();
    for (gid, value) in pairs {
        map.entry(gid).or_insert(value);
    }
    map
}

fn split<V>(map: BTreeMap<GlyphId, V>) -> Option<(CoverageTable, Vec<V>)> {
    if map.is_empty() {
        return None;
    }
    let (glyphs, values): (Vec<GlyphId>, Vec<V>) = map.into_iter().unzip();
    Some((CoverageTable::format_1(glyph_ids(&glyphs)), values))
}

fn glyph_ids(glyphs: &[GlyphId]) -> Vec<font_types::GlyphId16> {
    glyphs.iter().map(|gid| gid.to_glyph_id16()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gid(id: u16) -> GlyphId {
        GlyphId::new(id)
    }

    #[test]
    fn test_layout_table_registration() {
        let mut table: LayoutTable<()> = LayoutTable::default();
        let liga = Tag::new(b"liga");
        let calt = Tag::new(b"calt");

        let first = table.add_lookup((), &[liga, calt]);
        let second = table.add_lookup((), &[liga]);
        table.register(liga, second);

        assert_eq!(table.tags_of(first), vec![liga, calt]);
        assert_eq!(table.tags_of(second), vec![liga]);
        assert_eq!(
            table.sorted_features(),
            vec![(calt, vec![0]), (liga, vec![0, 1])]
        );
    }

    #[test]
    fn test_rule_remap() {
        let rule = SubstRule::Ligature { ligature: gid(9), components: vec![gid(1), gid(2)] };
        assert_eq!(rule.anchor(), gid(9));

        let remapped = rule.remap(gid(90), |g| Some(GlyphId::new(g.to_u16() + 10)));
        assert_eq!(
            remapped,
            Some(SubstRule::Ligature { ligature: gid(90), components: vec![gid(11), gid(12)] })
        );
        assert_eq!(rule.remap(gid(90), |g| (g != gid(2)).then_some(g)), None);
    }

    #[test]
    fn test_single_lookup_first_rule_wins() {
        let mut lookup = RuleLookup::new(RuleKind::Single, LookupFlag::empty());
        lookup.rules.push(SubstRule::Single { target: gid(5), replacement: gid(6) });
        lookup.rules.push(SubstRule::Single { target: gid(3), replacement: gid(4) });
        lookup.rules.push(SubstRule::Single { target: gid(5), replacement: gid(7) });

        let Some(SubstitutionLookup::Single(built)) = lookup.to_lookup() else {
            panic!("expected a single substitution lookup");
        };
        assert_eq!(built.subtables.len(), 1);
    }

    #[test]
    fn test_empty_lookup_builds_nothing() {
        let lookup = RuleLookup::new(RuleKind::Ligature, LookupFlag::empty());
        assert!(lookup.to_lookup().is_none());
    }
}
