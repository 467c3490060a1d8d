//! Supplementary stylistic features, built from artwork either as new
//! alternates or frozen into the default glyphs.

use anyhow::{Context, Result, anyhow};
use firple_font_merger::{
    ComposeError, FontAsset, Glyph, GlyphId, GlyphName, RuleKind, RuleLookup, SubstRule,
};
use kurbo::{Affine, BezPath};
use log::{debug, info};
use read_fonts::types::Tag;
use write_fonts::tables::layout::LookupFlag;

use crate::hint_control::codepoint_for_name;

/// How a supplementary feature ends up in the font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureMode {
    /// Add `{glyph}.{tag}` alternates and a substitution lookup under the tag.
    Create,
    /// Replace the default outlines. No lookup is added.
    Freeze,
}

/// The glyph a feature glyph name refers to: by code point, else by name.
fn resolve_glyph(asset: &FontAsset, name: &str) -> Result<GlyphId> {
    codepoint_for_name(asset, name)
        .and_then(|cp| asset.gid_by_codepoint(cp))
        .or_else(|| asset.gid_by_name(name))
        .ok_or_else(|| ComposeError::MissingGlyph(name.to_string()).into())
}

/// Apply one feature to `asset`.
///
/// `artwork` loads the outline for a glyph name; it is shifted up by
/// `y_shift`. Returns the names of the glyphs added to the asset.
pub fn apply_feature(
    asset: &mut FontAsset,
    tag: &str,
    glyphs: &[&str],
    mode: FeatureMode,
    y_shift: f64,
    mut artwork: impl FnMut(&str) -> Result<BezPath>,
) -> Result<Vec<GlyphName>> {
    let shift = Affine::translate((0.0, y_shift));
    let mut created = Vec::new();
    let mut lookup = RuleLookup::new(RuleKind::Single, LookupFlag::empty());

    for name in glyphs {
        let target = resolve_glyph(asset, name)?;
        let outline = shift * artwork(name)?;

        match mode {
            FeatureMode::Freeze => {
                let glyph = asset
                    .glyph_mut(target)
                    .ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))?;
                glyph.outline = outline;
                debug!("Froze {tag} into {}", glyph.name);
            }
            FeatureMode::Create => {
                let advance = asset
                    .glyph(target)
                    .map(|glyph| glyph.advance)
                    .ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))?;
                let alternate = Glyph {
                    name: GlyphName::new(format!("{name}.{tag}")),
                    codepoints: Vec::new(),
                    outline,
                    advance,
                };
                let gid = asset.push_glyph(alternate)?;
                let added = asset
                    .glyph(gid)
                    .map(|glyph| glyph.name.clone())
                    .ok_or_else(|| ComposeError::MissingGlyph(gid.to_string()))?;
                debug!("Created {added} for {tag}");
                created.push(added);
                lookup.rules.push(SubstRule::Single { target, replacement: gid });
            }
        }
    }

    if mode == FeatureMode::Create {
        let feature = Tag::new_checked(tag.as_bytes())
            .map_err(|_| anyhow!("Invalid feature tag: {tag}"))?;
        let lookup = lookup.to_lookup().with_context(|| format!("Feature {tag} has no glyphs"))?;
        asset.gsub_mut().add_lookup(lookup, &[feature]);
    }

    info!(
        "{} {tag}: {} glyphs",
        match mode {
            FeatureMode::Create => "Created",
            FeatureMode::Freeze => "Froze",
        },
        glyphs.len()
    );
    Ok(created)
}
