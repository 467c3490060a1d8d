//! GSUB/GPOS reading and building
//!
//! Existing lookups are carried over as owned write-fonts tables. Donor
//! substitution lookups are flattened into [`SubstRule`]s so they can be
//! remapped into the base glyph space one rule at a time.

use indexmap::IndexMap;
use read_fonts::{
    FontRef, ReadError, TableProvider,
    tables::{
        gsub::{
            SingleSubst as ReadSingleSubst, SubstitutionLookup as ReadLookup,
            SubstitutionSubtables,
        },
        layout::FeatureList,
    },
    types::Tag,
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        gpos::{Gpos, PositionLookup, PositionLookupList},
        gsub::{Gsub, SubstitutionLookup, SubstitutionLookupList},
        layout::{
            Feature, FeatureList as WriteFeatureList, FeatureRecord, LangSys, LookupFlag, Script,
            ScriptList, ScriptRecord,
        },
    },
};

use crate::{
    Result,
    tables::layout_types::{LayoutTable, LookupIndex, RuleKind, RuleLookup, SubstRule},
    types::GlyphId,
};

/// Lookup flag bits that do not refer to the source font's GDEF.
const PORTABLE_FLAG_BITS: u16 = 0x000F;

/// A donor substitution lookup, flattened for transfer.
#[derive(Debug, Clone)]
pub struct DonorLookup {
    pub index: LookupIndex,
    pub tags: Vec<Tag>,
    pub rules: RuleLookup,
}

/// Read the GSUB table into an editable layout table. A missing table reads as empty.
pub fn read_gsub(font: &FontRef) -> Result<LayoutTable<SubstitutionLookup>> {
    let gsub = match font.gsub() {
        Ok(gsub) => gsub,
        Err(ReadError::TableIsMissing(_)) => return Ok(LayoutTable::default()),
        Err(e) => return Err(e.into()),
    };
    let lookups = gsub
        .lookup_list()?
        .lookups()
        .iter()
        .map(|lookup| lookup.map(|lookup| -> SubstitutionLookup { lookup.to_owned_table() }))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let features = read_features(&gsub.feature_list()?)?;
    Ok(LayoutTable::new(lookups, features))
}

/// Read the GPOS table into an editable layout table. A missing table reads as empty.
pub fn read_gpos(font: &FontRef) -> Result<LayoutTable<PositionLookup>> {
    let gpos = match font.gpos() {
        Ok(gpos) => gpos,
        Err(ReadError::TableIsMissing(_)) => return Ok(LayoutTable::default()),
        Err(e) => return Err(e.into()),
    };
    let lookups = gpos
        .lookup_list()?
        .lookups()
        .iter()
        .map(|lookup| lookup.map(|lookup| -> PositionLookup { lookup.to_owned_table() }))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let features = read_features(&gpos.feature_list()?)?;
    Ok(LayoutTable::new(lookups, features))
}

fn read_features(feature_list: &FeatureList) -> Result<IndexMap<Tag, Vec<LookupIndex>>> {
    let mut features: IndexMap<Tag, Vec<LookupIndex>> = IndexMap::new();
    for record in feature_list.feature_records() {
        let feature = record.feature(feature_list.offset_data())?;
        let indices = features.entry(record.feature_tag()).or_default();
        for index in feature.lookup_list_indices() {
            let index = LookupIndex::new(index.get());
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
    }
    Ok(features)
}

/// Flatten every single, multiple, alternate and ligature lookup of a font's GSUB.
///
/// Extension lookups are unwrapped. Contextual, chaining and reverse chaining
/// lookups are skipped, as are lookups no feature refers to.
pub fn read_donor_lookups(font: &FontRef) -> Result<Vec<DonorLookup>> {
    let gsub = match font.gsub() {
        Ok(gsub) => gsub,
        Err(ReadError::TableIsMissing(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let features = read_features(&gsub.feature_list()?)?;
    let lookup_list = gsub.lookup_list()?;

    let mut donor_lookups = Vec::new();
    for (i, lookup) in lookup_list.lookups().iter().enumerate() {
        let index = LookupIndex::new(i as u16);
        let tags: Vec<Tag> = features
            .iter()
            .filter(|(_, indices)| indices.contains(&index))
            .map(|(tag, _)| *tag)
            .collect();
        if tags.is_empty() {
            continue;
        }
        if let Some(rules) = flatten_lookup(&lookup?)? {
            donor_lookups.push(DonorLookup { index, tags, rules });
        }
    }
    Ok(donor_lookups)
}

fn flatten_lookup(lookup: &ReadLookup) -> Result<Option<RuleLookup>> {
    let flag = LookupFlag::from_bits_truncate(lookup.lookup_flag().to_bits() & PORTABLE_FLAG_BITS);
    let gid = |g: font_types::GlyphId16| GlyphId::from(g);

    let rules = match lookup.subtables()? {
        SubstitutionSubtables::Single(subtables) => {
            let mut rules = RuleLookup::new(RuleKind::Single, flag);
            for subtable in subtables.iter() {
                match subtable? {
                    ReadSingleSubst::Format1(f1) => {
                        let delta = f1.delta_glyph_id() as i32;
                        for target in f1.coverage()?.iter() {
                            let replacement = ((target.to_u16() as i32 + delta) & 0xFFFF) as u16;
                            rules.rules.push(SubstRule::Single {
                                target: gid(target),
                                replacement: GlyphId::new(replacement),
                            });
                        }
                    }
                    ReadSingleSubst::Format2(f2) => {
                        let coverage = f2.coverage()?;
                        for (target, replacement) in
                            coverage.iter().zip(f2.substitute_glyph_ids())
                        {
                            rules.rules.push(SubstRule::Single {
                                target: gid(target),
                                replacement: gid(replacement.get()),
                            });
                        }
                    }
                }
            }
            rules
        }
        SubstitutionSubtables::Multiple(subtables) => {
            let mut rules = RuleLookup::new(RuleKind::Multiple, flag);
            for subtable in subtables.iter() {
                let subtable = subtable?;
                let coverage = subtable.coverage()?;
                for (target, sequence) in coverage.iter().zip(subtable.sequences().iter()) {
                    let sequence =
                        sequence?.substitute_glyph_ids().iter().map(|g| gid(g.get())).collect();
                    rules.rules.push(SubstRule::Multiple { target: gid(target), sequence });
                }
            }
            rules
        }
        SubstitutionSubtables::Alternate(subtables) => {
            let mut rules = RuleLookup::new(RuleKind::Alternate, flag);
            for subtable in subtables.iter() {
                let subtable = subtable?;
                let coverage = subtable.coverage()?;
                for (target, set) in coverage.iter().zip(subtable.alternate_sets().iter()) {
                    let alternates =
                        set?.alternate_glyph_ids().iter().map(|g| gid(g.get())).collect();
                    rules.rules.push(SubstRule::Alternate { target: gid(target), alternates });
                }
            }
            rules
        }
        SubstitutionSubtables::Ligature(subtables) => {
            let mut rules = RuleLookup::new(RuleKind::Ligature, flag);
            for subtable in subtables.iter() {
                let subtable = subtable?;
                let coverage = subtable.coverage()?;
                for (first, set) in coverage.iter().zip(subtable.ligature_sets().iter()) {
                    for ligature in set?.ligatures().iter() {
                        let ligature = ligature?;
                        let mut components = vec![gid(first)];
                        components
                            .extend(ligature.component_glyph_ids().iter().map(|g| gid(g.get())));
                        rules.rules.push(SubstRule::Ligature {
                            ligature: gid(ligature.ligature_glyph()),
                            components,
                        });
                    }
                }
            }
            rules
        }
        SubstitutionSubtables::Contextual(_)
        | SubstitutionSubtables::ChainContextual(_)
        | SubstitutionSubtables::Reverse(_) => return Ok(None),
    };
    Ok(Some(rules))
}

/// A script list with the single `DFLT` script whose default language system
/// enables all `feature_count` features.
fn default_script_list(feature_count: usize) -> ScriptList {
    let lang_sys = LangSys::new((0..feature_count as u16).collect());
    let script = Script::new(Some(lang_sys), Vec::new());
    ScriptList::new(vec![ScriptRecord::new(Tag::new(b"DFLT"), script)])
}

fn feature_list(features: Vec<(Tag, Vec<u16>)>) -> WriteFeatureList {
    WriteFeatureList::new(
        features
            .into_iter()
            .map(|(tag, lookup_indices)| {
                FeatureRecord::new(tag, Feature::new(None, lookup_indices))
            })
            .collect(),
    )
}

/// Compile a GSUB table with every feature under `DFLT`/`dflt`.
pub fn build_gsub(table: &LayoutTable<SubstitutionLookup>) -> Option<Gsub> {
    if table.is_empty() {
        return None;
    }
    let features = table.sorted_features();
    let script_list = default_script_list(features.len());
    let lookup_list = SubstitutionLookupList::new(table.lookups().to_vec());
    Some(Gsub::new(script_list, feature_list(features), lookup_list))
}

/// Compile a GPOS table with every feature under `DFLT`/`dflt`.
pub fn build_gpos(table: &LayoutTable<PositionLookup>) -> Option<Gpos> {
    if table.is_empty() {
        return None;
    }
    let features = table.sorted_features();
    let script_list = default_script_list(features.len());
    let lookup_list = PositionLookupList::new(table.lookups().to_vec());
    Some(Gpos::new(script_list, feature_list(features), lookup_list))
}
