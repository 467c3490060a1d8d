//! head, hhea, maxp and OS/2 updates after the glyph set changes

use read_fonts::{FontRef, TableProvider};
use write_fonts::tables::{head::Head, hhea::Hhea, maxp::Maxp, os2::Os2};

use crate::{
    Result,
    tables::{glyf::CompiledGlyf, hmtx::HorizontalExtents},
    types::Codepoint,
};

/// The vertical metrics the composition pipeline works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub units_per_em: u16,
    /// Em-box ascent: OS/2 `sTypoAscender`, or the hhea ascender without OS/2.
    pub ascent: i16,
}

pub fn read_vertical_metrics(font: &FontRef) -> Result<VerticalMetrics> {
    let units_per_em = font.head()?.units_per_em();
    let ascent = match font.os2() {
        Ok(os2) => os2.s_typo_ascender(),
        Err(_) => font.hhea()?.ascender().to_i16(),
    };
    Ok(VerticalMetrics { units_per_em, ascent })
}

/// Refresh the font bounding box and loca format.
pub fn update_head(head: &mut Head, compiled: &CompiledGlyf) {
    let mut bboxes = compiled.bboxes.iter().flatten();
    if let Some(first) = bboxes.next() {
        let (mut x_min, mut y_min, mut x_max, mut y_max) =
            (first.x_min, first.y_min, first.x_max, first.y_max);
        for bbox in bboxes {
            x_min = x_min.min(bbox.x_min);
            y_min = y_min.min(bbox.y_min);
            x_max = x_max.max(bbox.x_max);
            y_max = y_max.max(bbox.y_max);
        }
        head.x_min = x_min;
        head.y_min = y_min;
        head.x_max = x_max;
        head.y_max = y_max;
    }
    head.index_to_loc_format = compiled.loca_format as i16;
}

pub fn update_hhea(hhea: &mut Hhea, extents: &HorizontalExtents, num_glyphs: u16) {
    hhea.advance_width_max = extents.advance_width_max.into();
    hhea.min_left_side_bearing = extents.min_left_side_bearing.into();
    hhea.min_right_side_bearing = extents.min_right_side_bearing.into();
    hhea.x_max_extent = extents.x_max_extent.into();
    hhea.number_of_h_metrics = num_glyphs;
}

/// Every glyph is a simple glyph after compile, so the composite maxima drop to zero.
pub fn update_maxp(maxp: &mut Maxp, num_glyphs: u16, compiled: &CompiledGlyf) {
    maxp.num_glyphs = num_glyphs;
    if maxp.max_points.is_some() {
        maxp.max_points = Some(compiled.max_points);
        maxp.max_contours = Some(compiled.max_contours);
        maxp.max_composite_points = Some(0);
        maxp.max_composite_contours = Some(0);
        maxp.max_component_elements = Some(0);
        maxp.max_component_depth = Some(0);
    }
}

/// Refresh the first and last character indices from the cmap.
pub fn update_os2(os2: &mut Os2, codepoints: impl IntoIterator<Item = Codepoint>) {
    let mut codepoints = codepoints.into_iter().map(|cp| cp.to_u32().min(0xFFFF) as u16);
    if let Some(first) = codepoints.next() {
        let (min, max) = codepoints.fold((first, first), |(lo, hi), cp| (lo.min(cp), hi.max(cp)));
        os2.us_first_char_index = min;
        os2.us_last_char_index = max;
    }
}
