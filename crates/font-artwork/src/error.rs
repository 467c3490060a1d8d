use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("invalid path data: {0}")]
    PathData(#[from] kurbo::SvgParseError),

    #[error("invalid {attribute} attribute on <{element}>: {value:?}")]
    Attribute { element: String, attribute: &'static str, value: String },

    #[error("unsupported transform: {0:?}")]
    Transform(String),

    #[error("artwork has no outlines")]
    Empty,
}

pub type Result<T> = std::result::Result<T, ArtworkError>;
