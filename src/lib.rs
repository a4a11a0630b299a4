//! # stackviz
//!
//! Stacked bar chart core: sparse records in, stable pixel geometry out.
//!
//! Built on the [trueno](https://crates.io/crates/trueno) core library for the
//! SIMD offset accumulation. Drawing is delegated to a [`render::Renderer`];
//! an SVG renderer ships in [`output`].
//!
//! ## Pipeline
//!
//! - **Domains**: categories sorted, series in first-encounter order, both
//!   frozen at initialization
//! - **Normalize**: sparse records to a dense `[series][category]` matrix
//! - **Stack**: cumulative baselines in series order, bottom to top
//! - **Scale**: categories to bands, stack totals to pixel heights
//! - **Chart**: `initialize` renders, `update` emits transitions
//!
//! ## Quick Start
//!
//! ```rust
//! use stackviz::prelude::*;
//!
//! let records = vec![
//!     Record::new().with("x", "Jan").with("y", "A").with("v", 5.0),
//!     Record::new().with("x", "Jan").with("y", "B").with("v", 3.0),
//!     Record::new().with("x", "Feb").with("y", "A").with("v", 2.0),
//! ];
//! let config = ChartConfig::builder().measure_field("v").category_field("x").series_field("y");
//!
//! let mut chart = StackedBarChart::new(SvgRenderer::new(640, 400));
//! chart.initialize(&SurfaceSize::new(640, 400), config, &records)?;
//! chart.update(&[Record::new().with("x", "Feb").with("y", "B").with("v", 7.0)])?;
//!
//! let svg = chart.renderer().render_svg();
//! assert!(svg.contains("layer-1"));
//! # Ok::<(), stackviz::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `yaml`: load [`config::ChartSettings`] from YAML

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Data Modules
// ============================================================================

/// Records and field values.
pub mod record;

/// Frozen category and series domains.
pub mod domain;

/// Sparse records to a dense layer matrix.
pub mod normalize;

/// Cumulative stack offsets.
pub mod stack;

// ============================================================================
// Mapping Modules
// ============================================================================

/// Scale functions for data-to-pixel mappings.
pub mod scale;

/// Geometric primitives and emitted chart geometry.
pub mod geometry;

/// Color types.
pub mod color;

// ============================================================================
// Chart and Rendering Modules
// ============================================================================

/// Stacked bar chart controller.
pub mod chart;

/// Renderer port and drawing-surface handle.
pub mod render;

/// Output encoders (SVG).
pub mod output;

// ============================================================================
// Configuration, Diagnostics and Errors
// ============================================================================

/// Chart configuration and YAML settings.
pub mod config;

/// Structured diagnostics port.
pub mod diagnostics;

/// Error types for stackviz operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use stackviz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chart::StackedBarChart;
    pub use crate::color::Rgba;
    pub use crate::config::{ChartConfig, ChartConfigBuilder, ChartSettings, DataPolicy, Margins};
    pub use crate::diagnostics::{DiagnosticSink, MemorySink, NoopSink};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{ChartGeometry, GeometryTransition, Point, Rect};
    pub use crate::output::SvgRenderer;
    pub use crate::record::{FieldValue, Record};
    pub use crate::render::{RecordingRenderer, Renderer, Surface, SurfaceSize};
    pub use crate::scale::{BandScale, Scale, ValueScale};
    pub use batuta_common::display::WithDimensions;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
