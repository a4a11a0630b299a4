//! Geometric primitives and the geometry emitted to a renderer.
//!
//! All coordinates are plot-local: `x` grows right from the left edge of the
//! plot area, `y` grows down from its top edge, and the value 0 sits at
//! `y = plot_height`. [`ChartGeometry::origin`] is the translation of the
//! plot area within the surface.

use crate::record::FieldValue;

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Component-wise interpolation; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self::new(
            mix(self.x, other.x),
            mix(self.y, other.y),
            mix(self.width, other.width),
            mix(self.height, other.height),
        )
    }
}

/// Identifier of a layer group, stable for the lifetime of a chart.
///
/// The id is the series position in the series domain, so it also selects
/// the series color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// One bar: a series' extent within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    /// Category the bar sits in.
    pub category: FieldValue,
    /// Pixel rectangle.
    pub rect: Rect,
}

/// All bars of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    /// Group identifier.
    pub id: GroupId,
    /// Series value.
    pub series: FieldValue,
    /// One bar per category, in category-domain order.
    pub bars: Vec<BarGeometry>,
}

/// Axis label under a category band, anchored at its middle.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLabel {
    /// Category value.
    pub category: FieldValue,
    /// Formatted text.
    pub text: String,
    /// Anchor point.
    pub position: Point,
}

/// Horizontal gridline at one value-scale tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Gridline {
    /// Tick value.
    pub value: f32,
    /// Vertical position.
    pub y: f32,
    /// Horizontal span, `(start, end)`.
    pub span: (f32, f32),
    /// Formatted tick label.
    pub label: String,
    /// Where the label starts.
    pub label_position: Point,
    /// True for the tick at 0.
    pub is_baseline: bool,
}

/// Full geometry of a chart, as emitted at initialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartGeometry {
    /// Top-left corner of the plot area within the surface.
    pub origin: Point,
    /// Plot area width.
    pub plot_width: f32,
    /// Plot area height.
    pub plot_height: f32,
    /// Upper end of the value-scale domain.
    pub max_total: f32,
    /// One group per series, bottom to top.
    pub layers: Vec<LayerGroup>,
    /// One label per category.
    pub labels: Vec<CategoryLabel>,
    /// One gridline per value-scale tick.
    pub gridlines: Vec<Gridline>,
}

impl ChartGeometry {
    /// True if nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.labels.is_empty() && self.gridlines.is_empty()
    }

    /// Number of bars across all groups.
    #[must_use]
    pub fn bar_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.bars.len()).sum()
    }

    /// Layer group by id.
    #[must_use]
    pub fn layer(&self, id: GroupId) -> Option<&LayerGroup> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Move every bar to the end state of `transition` and take its gridlines.
    ///
    /// Bars in groups or categories the transition does not mention are left
    /// as they are.
    pub fn apply(&mut self, transition: &GeometryTransition) {
        for step in &transition.layers {
            let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == step.id) else {
                continue;
            };
            for (bar, change) in layer.bars.iter_mut().zip(&step.bars) {
                if bar.category == change.category {
                    bar.rect = change.to;
                }
            }
        }
        self.gridlines.clone_from(&transition.gridlines);
        self.max_total = transition.max_total;
    }
}

/// A bar moving from one rectangle to another.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTransition {
    /// Category the bar sits in.
    pub category: FieldValue,
    /// Rectangle before the update.
    pub from: Rect,
    /// Rectangle after the update.
    pub to: Rect,
}

impl BarTransition {
    /// Rectangle at progress `t` in `[0, 1]`.
    #[must_use]
    pub fn at(&self, t: f32) -> Rect {
        self.from.lerp(self.to, t)
    }

    /// True if the bar does not move.
    #[must_use]
    pub fn is_still(&self) -> bool {
        self.from == self.to
    }
}

/// All bar transitions of one layer group.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTransition {
    /// Group identifier.
    pub id: GroupId,
    /// One transition per bar, in category-domain order.
    pub bars: Vec<BarTransition>,
}

/// Geometry changes emitted by an update.
///
/// Updates only move and resize existing bars; groups, bars and labels are
/// never created or removed. Gridlines are replaced wholesale because the
/// value scale follows the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryTransition {
    /// Per-group bar transitions.
    pub layers: Vec<LayerTransition>,
    /// Gridlines for the new value scale.
    pub gridlines: Vec<Gridline>,
    /// New upper end of the value-scale domain.
    pub max_total: f32,
}

impl GeometryTransition {
    /// Transition from `previous` to `next`, pairing groups by id and bars
    /// by position.
    #[must_use]
    pub fn between(previous: &ChartGeometry, next: &ChartGeometry) -> Self {
        let layers = previous
            .layers
            .iter()
            .zip(&next.layers)
            .map(|(before, after)| LayerTransition {
                id: before.id,
                bars: before
                    .bars
                    .iter()
                    .zip(&after.bars)
                    .map(|(from, to)| BarTransition {
                        category: from.category.clone(),
                        from: from.rect,
                        to: to.rect,
                    })
                    .collect(),
            })
            .collect();

        Self { layers, gridlines: next.gridlines.clone(), max_total: next.max_total }
    }

    /// True if no bar moves.
    #[must_use]
    pub fn is_still(&self) -> bool {
        self.layers.iter().all(|layer| layer.bars.iter().all(BarTransition::is_still))
    }
}
