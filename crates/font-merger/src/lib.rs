//! Editable font model for composing one font out of a base and a donor.
//!
//! A [`FontAsset`] holds decomposed glyph outlines with indices by name and
//! code point, plus editable GSUB/GPOS. [`reconcile`] copies donor glyphs into
//! the base and [`transfer_rules`] brings the donor's substitution rules along.

mod asset;
mod error;
mod glyph_order;
mod reconcile;
pub mod tables;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod transfer;
mod types;

pub use asset::{FontAsset, Glyph};
pub use error::{ComposeError, Result};
pub use glyph_order::{GlyphName, STYLE_SUFFIXES};
pub use reconcile::{Reconciliation, reconcile};
pub use tables::{
    cmap::Variations,
    glyf::quadratic_path,
    layout_types::{LayoutTable, LookupIndex, RuleKind, RuleLookup, SubstRule},
    metrics::VerticalMetrics,
};
pub use transfer::{TransferReport, is_stylistic_tag, transfer_rules};
pub use types::{Codepoint, GlyphId, VariationSequence};
