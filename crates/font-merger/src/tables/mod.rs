//! Table-specific read and compile implementations

pub mod cmap;
pub mod glyf;
pub mod hmtx;
pub mod layout;
pub mod layout_types;
pub mod metrics;
pub mod post;
