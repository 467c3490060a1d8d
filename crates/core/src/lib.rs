//! Firple Core - build pipeline logic for Firple fonts.
//!
//! Fira Code and IBM Plex Sans JP are merged into one monospaced font per
//! style, then auto-hinted, optionally patched with Nerd Fonts icons, and
//! given their final metadata.

pub mod assets;
pub mod compose;
pub mod config;
pub mod error;
pub mod features;
pub mod hint_control;
pub mod io;
pub mod pipeline;
pub mod style;
pub mod tools;

pub use error::BuildError;
pub use features::FeatureMode;
pub use pipeline::{BuildOptions, build, build_all, build_style};
pub use style::{FontParams, OutputFormat, StyleConfig, Weight};
pub use tools::{DiagnosticGuard, parse_patcher_output};
