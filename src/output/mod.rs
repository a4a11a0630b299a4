//! Output encoders.

mod svg;

pub use svg::{SvgElement, SvgEncoder, SvgRenderer, TextAnchor};
