//! Affine transforms over glyph sets.
//!
//! Outlines are edited in place on a [`FontAsset`]; the set of glyphs each
//! transform touches is always passed explicitly as a [`GlyphSet`].

mod glyph_set;

use firple_font_merger::{Codepoint, ComposeError, FontAsset, Result};
use kurbo::Affine;
use log::{debug, info};

pub use glyph_set::GlyphSet;

/// Apply `affine` to the outline of every glyph in `set` and scale its advance
/// by `advance_scale`. Returns the number of glyphs transformed.
pub fn transform_glyphs(
    asset: &mut FontAsset,
    set: &GlyphSet,
    affine: Affine,
    advance_scale: f64,
) -> Result<usize> {
    let gids = set.resolve(asset)?;
    for gid in &gids {
        let glyph =
            asset.glyph_mut(*gid).ok_or_else(|| ComposeError::MissingGlyph(gid.to_string()))?;
        glyph.outline.apply_affine(affine);
        if advance_scale != 1.0 {
            glyph.advance = scale_advance(glyph.advance, advance_scale);
        }
    }
    debug!("Transformed {} glyphs by {affine:?}", gids.len());
    Ok(gids.len())
}

/// Scale outlines and advances horizontally by `scale`.
pub fn condense(asset: &mut FontAsset, set: &GlyphSet, scale: f64) -> Result<usize> {
    let count = transform_glyphs(asset, set, Affine::scale_non_uniform(scale, 1.0), scale)?;
    info!("Condensed {count} glyphs to {:.0}%", scale * 100.0);
    Ok(count)
}

/// Advance width of the glyph mapped to `codepoint`.
pub fn advance_of(asset: &FontAsset, codepoint: Codepoint) -> Result<u16> {
    asset
        .gid_by_codepoint(codepoint)
        .and_then(|gid| asset.glyph(gid))
        .map(|glyph| glyph.advance)
        .ok_or(ComposeError::UnmappedCodepoint(codepoint))
}

/// The monospace grid: every cell is one or two half widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthGrid {
    pub half_width: u16,
}

impl WidthGrid {
    pub fn new(half_width: u16) -> Self {
        Self { half_width }
    }

    pub fn full_width(&self) -> u16 {
        self.half_width.saturating_mul(2)
    }

    /// The cell a glyph of advance `scaled` occupies.
    pub fn fit(&self, scaled: f64) -> u16 {
        if scaled > self.half_width as f64 { self.full_width() } else { self.half_width }
    }
}

/// Scale every glyph in `set` uniformly by `scale` and center it on its grid cell.
///
/// The advance becomes exactly one or two half widths.
pub fn normalize_widths(
    asset: &mut FontAsset,
    set: &GlyphSet,
    grid: WidthGrid,
    scale: f64,
) -> Result<usize> {
    let gids = set.resolve(asset)?;
    let (mut half, mut full) = (0usize, 0usize);
    for gid in &gids {
        let glyph =
            asset.glyph_mut(*gid).ok_or_else(|| ComposeError::MissingGlyph(gid.to_string()))?;
        let scaled = glyph.advance as f64 * scale;
        let target = grid.fit(scaled);
        let offset = (target as f64 - scaled) / 2.0;
        glyph.outline.apply_affine(Affine::translate((offset, 0.0)) * Affine::scale(scale));
        glyph.advance = target;

        if target == grid.half_width {
            half += 1;
        } else {
            full += 1;
        }
    }
    info!("Normalized {} glyphs: {half} half width, {full} full width", gids.len());
    Ok(gids.len())
}

/// Shift right by `offset`, then slant by `angle` degrees.
pub fn italic_transform(angle: f64, offset: f64) -> Affine {
    Affine::skew(angle.to_radians().tan(), 0.0) * Affine::translate((offset, 0.0))
}

/// Slant the glyphs in `set` by `angle` degrees after shifting them by `offset`.
///
/// Advances are unchanged.
pub fn shear(asset: &mut FontAsset, set: &GlyphSet, angle: f64, offset: f64) -> Result<usize> {
    let count = transform_glyphs(asset, set, italic_transform(angle, offset), 1.0)?;
    info!("Skewed {count} glyphs by {angle}°");
    Ok(count)
}

/// Extra slant that restores `angle` after a horizontal condense by `scale`.
pub fn compensation_angle(angle: f64, scale: f64) -> f64 {
    angle - (angle.to_radians().tan() * scale).atan().to_degrees()
}

fn scale_advance(advance: u16, scale: f64) -> u16 {
    (advance as f64 * scale).round().clamp(0.0, u16::MAX as f64) as u16
}
