//! hmtx table reading and building

use read_fonts::{FontRef, TableProvider};
use write_fonts::tables::{
    glyf::Bbox,
    hmtx::{Hmtx, LongMetric},
};

use crate::{Result, types::GlyphId};

/// Read the advance width of every glyph.
///
/// Glyphs past `numberOfHMetrics` share the last advance, as the format specifies.
pub fn read_advances(font: &FontRef, num_glyphs: u16) -> Result<Vec<u16>> {
    let hmtx = font.hmtx()?;
    Ok((0..num_glyphs)
        .map(|gid| hmtx.advance(GlyphId::new(gid).to_font()).unwrap_or(0))
        .collect())
}

/// Horizontal extents summarized for hhea.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizontalExtents {
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
}

/// Build an hmtx table with one long metric per glyph.
///
/// The side bearing of each glyph is its outline's `x_min`, or zero when it
/// has no contours.
pub fn build_hmtx(advances: &[u16], bboxes: &[Option<Bbox>]) -> (Hmtx, HorizontalExtents) {
    let mut extents = HorizontalExtents::default();
    let mut first_outline = true;

    let h_metrics = advances
        .iter()
        .zip(bboxes)
        .map(|(&advance, bbox)| {
            extents.advance_width_max = extents.advance_width_max.max(advance);
            let side_bearing = match bbox {
                Some(bbox) => {
                    let rsb = advance as i32 - bbox.x_max as i32;
                    let rsb = rsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
                    if first_outline {
                        extents.min_left_side_bearing = bbox.x_min;
                        extents.min_right_side_bearing = rsb;
                        extents.x_max_extent = bbox.x_max;
                        first_outline = false;
                    } else {
                        extents.min_left_side_bearing = extents.min_left_side_bearing.min(bbox.x_min);
                        extents.min_right_side_bearing = extents.min_right_side_bearing.min(rsb);
                        extents.x_max_extent = extents.x_max_extent.max(bbox.x_max);
                    }
                    bbox.x_min
                }
                None => 0,
            };
            LongMetric { advance, side_bearing }
        })
        .collect();

    (Hmtx::new(h_metrics, Vec::new()), extents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x_min: i16, x_max: i16) -> Option<Bbox> {
        Some(Bbox { x_min, y_min: 0, x_max, y_max: 700 })
    }

    #[test]
    fn test_build_hmtx_extents() {
        let (hmtx, extents) =
            build_hmtx(&[500, 600, 1200], &[None, bbox(-20, 580), bbox(100, 1150)]);

        assert_eq!(hmtx.h_metrics.len(), 3);
        assert_eq!(hmtx.h_metrics[0].side_bearing, 0);
        assert_eq!(hmtx.h_metrics[1].side_bearing, -20);
        assert_eq!(
            extents,
            HorizontalExtents {
                advance_width_max: 1200,
                min_left_side_bearing: -20,
                min_right_side_bearing: 20,
                x_max_extent: 1150,
            }
        );
    }
}
