//! glyf table reading and building (TrueType outlines)
//!
//! Outlines are drawn through skrifa into `kurbo::BezPath`s on load, which
//! decomposes composite glyphs and drops per-glyph hinting instructions. On
//! compile every glyph is written back as a simple glyph, so no glyph ever
//! references another glyph's outline.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use read_fonts::FontRef;
use skrifa::{
    MetadataProvider,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
};
use write_fonts::tables::{
    glyf::{Bbox, Glyf, GlyfLocaBuilder, Glyph as WriteGlyph, SimpleGlyph},
    loca::{Loca, LocaFormat},
};

use crate::{ComposeError, Result, asset::Glyph, types::GlyphId};

/// Maximum distance between a cubic segment and its quadratic approximation, in font units.
const CUBIC_TOLERANCE: f64 = 0.5;

/// Pen that records skrifa drawing commands into a `BezPath`.
#[derive(Debug, Default)]
pub struct BezPathPen {
    path: BezPath,
}

impl BezPathPen {
    pub fn into_path(self) -> BezPath {
        self.path
    }
}

impl OutlinePen for BezPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path.quad_to((cx0 as f64, cy0 as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            (cx0 as f64, cy0 as f64),
            (cx1 as f64, cy1 as f64),
            (x as f64, y as f64),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Draw every glyph outline of `font` in font units.
pub fn read_outlines(font: &FontRef, num_glyphs: u16) -> Result<Vec<BezPath>> {
    let outlines = font.outline_glyphs();
    let settings = || DrawSettings::unhinted(Size::unscaled(), LocationRef::default());

    (0..num_glyphs)
        .map(|gid| {
            let glyph_id = GlyphId::new(gid);
            let Some(outline) = outlines.get(glyph_id.to_font()) else {
                return Ok(BezPath::new());
            };
            let mut pen = BezPathPen::default();
            outline.draw(settings(), &mut pen).map_err(|e| ComposeError::DrawError {
                glyph: glyph_id,
                reason: e.to_string(),
            })?;
            Ok(pen.into_path())
        })
        .collect()
}

/// Normalize a path so it can be stored as a TrueType simple glyph.
///
/// Cubic segments become quadratic splines, subpaths without any segment
/// are dropped, and every remaining subpath is closed.
pub fn quadratic_path(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut subpath: Vec<PathEl> = Vec::new();
    let mut current = Point::ZERO;

    let flush = |subpath: &mut Vec<PathEl>, out: &mut BezPath| {
        if subpath.len() > 1 {
            for el in subpath.drain(..) {
                out.push(el);
            }
            out.close_path();
        }
        subpath.clear();
    };

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut subpath, &mut out);
                subpath.push(PathEl::MoveTo(p));
                current = p;
            }
            PathEl::LineTo(p) => {
                subpath.push(PathEl::LineTo(p));
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                subpath.push(PathEl::QuadTo(c, p));
                current = p;
            }
            PathEl::CurveTo(c0, c1, p) => {
                let cubic = CubicBez::new(current, c0, c1, p);
                for (_, _, quad) in cubic.to_quads(CUBIC_TOLERANCE) {
                    subpath.push(PathEl::QuadTo(quad.p1, quad.p2));
                }
                current = p;
            }
            PathEl::ClosePath => flush(&mut subpath, &mut out),
        }
    }
    flush(&mut subpath, &mut out);
    out
}

/// A compiled glyf/loca pair plus the bounding box of every glyph.
pub struct CompiledGlyf {
    pub glyf: Glyf,
    pub loca: Loca,
    pub loca_format: LocaFormat,
    /// `None` for glyphs without contours.
    pub bboxes: Vec<Option<Bbox>>,
    pub max_points: u16,
    pub max_contours: u16,
}

/// Build glyf and loca tables from glyph outlines, in glyph id order.
pub fn build_glyf(glyphs: &[Glyph]) -> Result<CompiledGlyf> {
    let mut builder = GlyfLocaBuilder::new();
    let mut bboxes = Vec::with_capacity(glyphs.len());
    let mut max_points = 0u16;
    let mut max_contours = 0u16;

    for glyph in glyphs {
        let path = quadratic_path(&glyph.outline);
        if path.elements().is_empty() {
            builder.add_glyph(&WriteGlyph::Empty)?;
            bboxes.push(None);
            continue;
        }

        let simple = SimpleGlyph::from_bezpath(&path).map_err(|e| {
            ComposeError::MalformedOutline { glyph: glyph.name.clone(), reason: format!("{e:?}") }
        })?;
        let points: usize = simple.contours.iter().map(|c| c.len()).sum();
        max_points = max_points.max(points.min(u16::MAX as usize) as u16);
        max_contours = max_contours.max(simple.contours.len().min(u16::MAX as usize) as u16);
        bboxes.push(Some(simple.bbox));
        builder.add_glyph(&WriteGlyph::Simple(simple))?;
    }

    let (glyf, loca, loca_format) = builder.build();
    Ok(CompiledGlyf { glyf, loca, loca_format, bboxes, max_points, max_contours })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_path_converts_cubics() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
        path.close_path();

        let converted = quadratic_path(&path);
        assert!(converted.elements().iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
        assert!(matches!(converted.elements().last(), Some(PathEl::ClosePath)));
        assert!(SimpleGlyph::from_bezpath(&converted).is_ok());
    }

    #[test]
    fn test_quadratic_path_drops_lone_moves() {
        let mut path = BezPath::new();
        path.move_to((10.0, 10.0));
        path.move_to((0.0, 0.0));
        path.line_to((100.0, 0.0));
        path.line_to((100.0, 100.0));

        let converted = quadratic_path(&path);
        assert_eq!(converted.elements().len(), 4);
        assert_eq!(converted.elements()[0], PathEl::MoveTo(Point::new(0.0, 0.0)));
    }
}
