use std::result;

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::{BuilderError, error};

use crate::{
    glyph_order::GlyphName,
    types::{Codepoint, GlyphId},
};

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("required table '{0}' not found")]
    MissingTable(&'static str),

    #[error("glyph '{0}' not found")]
    MissingGlyph(String),

    #[error("no glyph is mapped to {0}")]
    UnmappedCodepoint(Codepoint),

    #[error("failed to draw outline of {glyph}: {reason}")]
    DrawError { glyph: GlyphId, reason: String },

    #[error("outline of glyph '{glyph}' cannot be stored as TrueType: {reason}")]
    MalformedOutline { glyph: GlyphName, reason: String },

    #[error("font has {0} glyphs, more than a TrueType font can address")]
    TooManyGlyphs(usize),

    #[error("failed to build cmap table")]
    CmapBuildError,
}

pub type Result<T> = result::Result<T, ComposeError>;
