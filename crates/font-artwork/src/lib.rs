//! Import hand-drawn SVG artwork as TrueType glyph outlines.
//!
//! Coordinates are taken as font units. The y axis is flipped about the
//! font's ascent so that SVG `y = 0` lands on the ascender line, and cubic
//! segments are approximated by quadratics.

mod error;
mod transform;

use std::{fs, path::Path};

use firple_font_merger::quadratic_path;
use kurbo::{Affine, BezPath, Circle, Ellipse, Rect, Shape};
use log::debug;
use roxmltree::{Document, Node};

pub use error::{ArtworkError, Result};
pub use transform::{parse_numbers, parse_transform};

/// Converts SVG documents into glyph outlines for a font with the given ascent.
#[derive(Debug, Clone, Copy)]
pub struct ArtworkImporter {
    ascent: f64,
}

impl ArtworkImporter {
    pub fn new(ascent: f64) -> Self {
        Self { ascent }
    }

    /// Read and convert the SVG file at `path`.
    pub fn import_file(&self, path: &Path) -> Result<BezPath> {
        let svg = fs::read_to_string(path)
            .map_err(|source| ArtworkError::Io { path: path.to_path_buf(), source })?;
        let outline = self.import_str(&svg)?;
        debug!("Imported {} ({} elements)", path.display(), outline.elements().len());
        Ok(outline)
    }

    /// Convert an SVG document. Fails if it contains no outlines.
    pub fn import_str(&self, svg: &str) -> Result<BezPath> {
        let doc = Document::parse(svg)?;
        let root = doc.root_element();
        let to_font = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, self.ascent]) * view_box(root)?;

        let mut outline = BezPath::new();
        for node in root.descendants().filter(|n| n.is_element()) {
            let Some(shape) = shape_path(node)? else {
                continue;
            };
            let affine = to_font * accumulated_transform(node)?;
            outline.extend((affine * shape).elements().iter().copied());
        }

        let outline = quadratic_path(&outline);
        if outline.elements().is_empty() {
            return Err(ArtworkError::Empty);
        }
        Ok(outline)
    }
}

/// Shift by the negated `viewBox` origin, if any.
fn view_box(root: Node<'_, '_>) -> Result<Affine> {
    let Some(value) = root.attribute("viewBox") else {
        return Ok(Affine::IDENTITY);
    };
    match parse_numbers(value).as_deref() {
        Some([min_x, min_y, _, _]) => Ok(Affine::translate((-min_x, -min_y))),
        _ => Err(invalid(root, "viewBox", value)),
    }
}

/// Product of the `transform` attributes of `node` and its ancestors.
fn accumulated_transform(node: Node<'_, '_>) -> Result<Affine> {
    let mut affine = Affine::IDENTITY;
    for element in node.ancestors().filter(|n| n.is_element()) {
        if let Some(value) = element.attribute("transform") {
            affine = parse_transform(value)? * affine;
        }
    }
    Ok(affine)
}

fn shape_path(node: Node<'_, '_>) -> Result<Option<BezPath>> {
    let path = match node.tag_name().name() {
        "path" => match node.attribute("d") {
            Some(d) => BezPath::from_svg(d)?,
            None => return Ok(None),
        },
        "polygon" | "polyline" => {
            let value = node.attribute("points").unwrap_or_default();
            let points = parse_numbers(value).ok_or_else(|| invalid(node, "points", value))?;
            let mut path = BezPath::new();
            for (i, pair) in points.chunks_exact(2).enumerate() {
                if i == 0 {
                    path.move_to((pair[0], pair[1]));
                } else {
                    path.line_to((pair[0], pair[1]));
                }
            }
            path.close_path();
            path
        }
        "rect" => {
            let (x, y) = (number(node, "x", 0.0)?, number(node, "y", 0.0)?);
            let (w, h) = (number(node, "width", 0.0)?, number(node, "height", 0.0)?);
            Rect::new(x, y, x + w, y + h).to_path(0.1)
        }
        "circle" => {
            let (cx, cy) = (number(node, "cx", 0.0)?, number(node, "cy", 0.0)?);
            Circle::new((cx, cy), number(node, "r", 0.0)?).to_path(0.1)
        }
        "ellipse" => {
            let (cx, cy) = (number(node, "cx", 0.0)?, number(node, "cy", 0.0)?);
            let (rx, ry) = (number(node, "rx", 0.0)?, number(node, "ry", 0.0)?);
            Ellipse::new((cx, cy), (rx, ry), 0.0).to_path(0.1)
        }
        _ => return Ok(None),
    };
    Ok(Some(path))
}

fn number(node: Node<'_, '_>, attribute: &'static str, default: f64) -> Result<f64> {
    match node.attribute(attribute) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .trim_end_matches("px")
            .parse()
            .map_err(|_| invalid(node, attribute, value)),
    }
}

fn invalid(node: Node<'_, '_>, attribute: &'static str, value: &str) -> ArtworkError {
    ArtworkError::Attribute {
        element: node.tag_name().name().to_string(),
        attribute,
        value: value.to_string(),
    }
}
