//! Glyph names and the naming rules that decide which unencoded donor glyphs
//! are carried into the base.

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// Name suffixes of donor glyphs that only make sense inside the donor's own
/// italic and proportional itemization.
pub const STYLE_SUFFIXES: &[&str] = &[".italic", ".ital", ".it", ".prop", ".pwid"];

/// A post table glyph name. Names are unique within one font asset; clashes
/// are resolved with [`GlyphName::disambiguate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part of the name before the first `.`, e.g. `uni3042` for `uni3042.ss11`.
    pub fn base_form(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// The base form if this name is an `alt` variant (`a.alt`, `uni3042.alt01`).
    pub fn alt_base(&self) -> Option<&str> {
        let (base, suffix) = self.0.split_once('.')?;
        suffix.split('.').any(|part| part.starts_with("alt")).then_some(base)
    }

    /// Whether the name ends in one of the donor's [`STYLE_SUFFIXES`].
    pub fn has_style_suffix(&self) -> bool {
        STYLE_SUFFIXES.iter().any(|suffix| self.0.ends_with(suffix))
    }

    /// Append a numeric suffix (`name.1`, `name.2`, ...) until `taken` reports a free name.
    pub fn disambiguate(&self, taken: impl Fn(&str) -> bool) -> GlyphName {
        if !taken(&self.0) {
            return self.clone();
        }
        (1..)
            .map(|n| format!("{}.{n}", self.0))
            .find(|candidate| !taken(candidate))
            .map(GlyphName)
            .unwrap_or_else(|| self.clone())
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GlyphName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for GlyphName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for GlyphName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
