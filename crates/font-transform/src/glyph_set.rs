//! Explicit sets of glyphs a transform applies to

use firple_font_merger::{ComposeError, FontAsset, GlyphId, GlyphName, Result};
use indexmap::IndexSet;

/// Glyph names a transform applies to, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphSet {
    names: IndexSet<GlyphName>,
}

impl GlyphSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every glyph of `asset`.
    pub fn all(asset: &FontAsset) -> Self {
        asset.glyphs().iter().map(|g| g.name.clone()).collect()
    }

    /// Every glyph of `asset` except `excluded`.
    pub fn all_except<S: AsRef<str>>(asset: &FontAsset, excluded: &[S]) -> Self {
        asset
            .glyphs()
            .iter()
            .filter(|g| !excluded.iter().any(|name| g.name == name.as_ref()))
            .map(|g| g.name.clone())
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<GlyphName>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphName> {
        self.names.iter()
    }

    /// Resolve the names against `asset`. Every name must exist.
    pub fn resolve(&self, asset: &FontAsset) -> Result<Vec<GlyphId>> {
        self.names
            .iter()
            .map(|name| {
                asset.gid_by_name(name).ok_or_else(|| ComposeError::MissingGlyph(name.to_string()))
            })
            .collect()
    }
}

impl<N: Into<GlyphName>> FromIterator<N> for GlyphSet {
    fn from_iter<T: IntoIterator<Item = N>>(iter: T) -> Self {
        Self { names: iter.into_iter().map(Into::into).collect() }
    }
}

impl<N: Into<GlyphName>> Extend<N> for GlyphSet {
    fn extend<T: IntoIterator<Item = N>>(&mut self, iter: T) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}
