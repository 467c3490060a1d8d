//! The SVG `transform` attribute

use kurbo::Affine;

use crate::{ArtworkError, Result};

/// Parse a transform list such as `translate(10 20) scale(2)`.
///
/// The functions apply right to left, as in SVG.
pub fn parse_transform(value: &str) -> Result<Affine> {
    let mut affine = Affine::IDENTITY;
    let mut rest = value.trim();
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(|| invalid(value))?;
        let close = rest.find(')').ok_or_else(|| invalid(value))?;
        if close < open {
            return Err(invalid(value));
        }
        let name = rest[..open].trim().trim_start_matches(',').trim();
        let args = parse_numbers(&rest[open + 1..close]).ok_or_else(|| invalid(value))?;
        affine *= function(name, &args).ok_or_else(|| invalid(value))?;
        rest = rest[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }
    Ok(affine)
}

fn function(name: &str, args: &[f64]) -> Option<Affine> {
    let affine = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
        ("translate", [tx]) => Affine::translate((*tx, 0.0)),
        ("translate", [tx, ty]) => Affine::translate((*tx, *ty)),
        ("scale", [s]) => Affine::scale(*s),
        ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
        ("rotate", [deg]) => Affine::rotate(deg.to_radians()),
        ("rotate", [deg, cx, cy]) => Affine::rotate_about(deg.to_radians(), (*cx, *cy)),
        ("skewX", [deg]) => Affine::skew(deg.to_radians().tan(), 0.0),
        ("skewY", [deg]) => Affine::skew(0.0, deg.to_radians().tan()),
        _ => return None,
    };
    Some(affine)
}

/// Numbers separated by commas and/or whitespace.
pub fn parse_numbers(value: &str) -> Option<Vec<f64>> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}

fn invalid(value: &str) -> ArtworkError {
    ArtworkError::Transform(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_parse_translate_then_scale() {
        let affine = parse_transform("translate(10, 20) scale(2)").unwrap();
        assert_eq!(affine * Point::new(1.0, 1.0), Point::new(12.0, 22.0));
    }

    #[test]
    fn test_parse_matrix() {
        let affine = parse_transform("matrix(1 0 0 -1 0 800)").unwrap();
        assert_eq!(affine * Point::new(5.0, 100.0), Point::new(5.0, 700.0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_transform("translate(1").is_err());
        assert!(parse_transform("wobble(1)").is_err());
        assert!(parse_transform("scale(a)").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_numbers("1,2 3\n4"), Some(vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(parse_numbers("1 x"), None);
    }
}
