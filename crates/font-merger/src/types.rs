//! Glyph ids, code points and variation sequences of a font asset

use std::fmt::{self, Display, Formatter};

use font_types::GlyphId16;

/// Index of a glyph in one font asset's glyph order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(u16);

impl GlyphId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }

    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }

    /// The 32-bit id taken by skrifa and the cmap builder.
    pub fn to_font(self) -> read_fonts::types::GlyphId {
        read_fonts::types::GlyphId::new(u32::from(self.0))
    }

    pub fn to_glyph_id16(self) -> GlyphId16 {
        GlyphId16::new(self.0)
    }
}

impl From<GlyphId16> for GlyphId {
    fn from(gid: GlyphId16) -> Self {
        Self(gid.to_u16())
    }
}

impl Display for GlyphId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "glyph #{}", self.0)
    }
}

/// A Unicode scalar value as mapped by cmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(u32);

impl Codepoint {
    pub const fn new(cp: u32) -> Self {
        Self(cp)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<char> for Codepoint {
    fn from(c: char) -> Self {
        Self(c as u32)
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// A base character followed by a variation selector, e.g. U+8FBB U+E0100.
///
/// Ordered by base first, which is the order a format 14 subtable lists them
/// in under each selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariationSequence {
    pub base: Codepoint,
    pub selector: Codepoint,
}

impl VariationSequence {
    pub const fn new(base: Codepoint, selector: Codepoint) -> Self {
        Self { base, selector }
    }
}

impl Display for VariationSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.base, self.selector)
    }
}
