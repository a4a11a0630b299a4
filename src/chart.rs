//! Stacked bar chart controller.
//!
//! [`StackedBarChart`] owns the chart state and drives the pipeline:
//!
//! ```text
//! records ─► normalize ─► stack ─► project ─► Renderer
//!               ▲           ▲         ▲
//!            domains     domains   band scale (frozen)
//!            (frozen)              value scale (tracks data)
//! ```
//!
//! State is split in two. [`FrozenState`] (config, domains, band scale, plot
//! area) is built by [`StackedBarChart::initialize`] and never touched by
//! [`StackedBarChart::update`]. [`LiveState`] (value scale, stacks, current
//! geometry) is rebuilt on every pass.
//!
//! # Lifecycle
//!
//! `Uninitialized ─initialize─► Initialized ─update─► Initialized`
//!
//! Calling `initialize` again rebuilds everything from scratch; the renderer
//! is cleared first. This is how new categories or series are picked up:
//! `update` ignores records whose category or series is not in the frozen
//! domains.
//!
//! Calls must not overlap; every entry point takes `&mut self`.

use crate::config::{ChartConfig, ChartConfigBuilder, Margins};
use crate::diagnostics::{DiagnosticSink, LayoutEvent, NoopSink, Phase};
use crate::domain::Domains;
use crate::error::{Error, Result};
use crate::geometry::{
    BarGeometry, CategoryLabel, ChartGeometry, GeometryTransition, Gridline, GroupId, LayerGroup,
    Point, Rect,
};
use crate::normalize::normalize;
use crate::record::Record;
use crate::render::{Renderer, Surface};
use crate::scale::{BandScale, Scale, ValueScale};
use crate::stack::{stack, LayerPoint, Stacks};

/// Gap between the plot edge and axis labels.
const LABEL_OFFSET: f32 = 6.0;

/// Plot area inside a surface, after margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    /// Top-left corner within the surface.
    pub origin: Point,
    /// Width, never negative.
    pub width: f32,
    /// Height, never negative.
    pub height: f32,
}

impl PlotArea {
    /// Plot area of `surface` with `margins` removed.
    #[must_use]
    pub fn new<S: Surface + ?Sized>(surface: &S, margins: Margins) -> Self {
        let width = surface.width() as f32 - margins.left - margins.right;
        let height = surface.height() as f32 - margins.top - margins.bottom;
        Self {
            origin: Point::new(margins.left, margins.top),
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// State fixed at initialization.
#[derive(Debug)]
pub struct FrozenState {
    config: ChartConfig,
    domains: Domains,
    band_scale: BandScale,
    plot: PlotArea,
}

impl FrozenState {
    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Category and series domains.
    #[must_use]
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Category band scale.
    #[must_use]
    pub fn band_scale(&self) -> BandScale {
        self.band_scale
    }

    /// Plot area.
    #[must_use]
    pub fn plot(&self) -> PlotArea {
        self.plot
    }
}

/// State rebuilt on every pass.
#[derive(Debug, Clone)]
pub struct LiveState {
    value_scale: ValueScale,
    stacks: Stacks,
    geometry: ChartGeometry,
}

impl LiveState {
    /// Value scale for the current data.
    #[must_use]
    pub fn value_scale(&self) -> ValueScale {
        self.value_scale
    }

    /// Current stacked layers.
    #[must_use]
    pub fn stacks(&self) -> &Stacks {
        &self.stacks
    }

    /// Geometry last computed. Also kept for degenerate charts, where it is
    /// never emitted.
    #[must_use]
    pub fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }
}

/// Stacked bar chart controller.
///
/// Owns a [`Renderer`] and a [`DiagnosticSink`]. Geometry is pushed to the
/// renderer; nothing is drawn by the chart itself.
pub struct StackedBarChart<R> {
    renderer: R,
    sink: Box<dyn DiagnosticSink>,
    state: Option<(FrozenState, LiveState)>,
}

impl<R: Renderer> StackedBarChart<R> {
    /// Create an uninitialized chart that reports to nobody.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self::with_sink(renderer, NoopSink)
    }

    /// Create an uninitialized chart reporting to `sink`.
    #[must_use]
    pub fn with_sink(renderer: R, sink: impl DiagnosticSink + 'static) -> Self {
        Self { renderer, sink: Box::new(sink), state: None }
    }

    /// True once `initialize` has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// State fixed at initialization.
    #[must_use]
    pub fn frozen(&self) -> Option<&FrozenState> {
        self.state.as_ref().map(|(frozen, _)| frozen)
    }

    /// State from the last pass.
    #[must_use]
    pub fn live(&self) -> Option<&LiveState> {
        self.state.as_ref().map(|(_, live)| live)
    }

    /// Frozen domains, once initialized.
    #[must_use]
    pub fn domains(&self) -> Option<&Domains> {
        self.frozen().map(FrozenState::domains)
    }

    /// Geometry from the last pass, once initialized.
    #[must_use]
    pub fn geometry(&self) -> Option<&ChartGeometry> {
        self.live().map(LiveState::geometry)
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Give back the renderer.
    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Build the chart from scratch and render it.
    ///
    /// Validates `config`, derives and freezes both domains from `records`,
    /// builds the scales, and emits full geometry: one layer group per series,
    /// one bar per category in each group, one label per category, one
    /// gridline per value tick. With no usable records the domains are empty
    /// and nothing is emitted.
    ///
    /// On an initialized chart the renderer is cleared first. If anything
    /// fails, no geometry is emitted and the previous state is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a field name is missing or a setting is invalid.
    /// - [`Error::Data`] for a malformed record under the strict data policy.
    pub fn initialize<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        config: impl Into<ChartConfigBuilder>,
        records: &[Record],
    ) -> Result<()> {
        let config = config.into().build()?;
        let plot = PlotArea::new(surface, config.margins());

        let domains =
            Domains::derive(records, config.fields(), config.data_policy(), self.sink.as_ref())?;
        let band_scale =
            BandScale::new(domains.categories.len(), plot.width, config.inner_padding())?;
        let frozen = FrozenState { config, domains, band_scale, plot };
        let live = layout(&frozen, records, self.sink.as_ref())?;

        if self.state.is_some() {
            self.renderer.clear();
        }
        if !frozen.domains.is_empty() {
            self.renderer.render(&live.geometry);
        }
        report(self.sink.as_ref(), Phase::Initialize, &frozen, &live);
        self.state = Some((frozen, live));
        Ok(())
    }

    /// Recompute the stacks from `records` and move the bars.
    ///
    /// Domains, band scale and plot area are reused as they are. Records whose
    /// category or series is not in the frozen domains are ignored. The value
    /// scale follows the new data, so bars and gridlines may move even where
    /// measures did not change. Emits a [`GeometryTransition`]; groups, bars
    /// and labels are never created or removed.
    ///
    /// # Errors
    ///
    /// - [`Error::State`] if called before [`initialize`](Self::initialize).
    /// - [`Error::Data`] for a malformed record under the strict data policy;
    ///   the chart keeps its previous state.
    pub fn update(&mut self, records: &[Record]) -> Result<()> {
        let Some((frozen, current)) = self.state.as_mut() else {
            return Err(Error::State("update called before initialize".to_string()));
        };
        let live = layout(frozen, records, self.sink.as_ref())?;

        if !frozen.domains.is_empty() {
            let transition = GeometryTransition::between(&current.geometry, &live.geometry);
            self.renderer.transition(&transition);
        }
        *current = live;
        report(self.sink.as_ref(), Phase::Update, frozen, current);
        Ok(())
    }
}

/// Normalize, stack, and project `records` over frozen state.
fn layout(frozen: &FrozenState, records: &[Record], sink: &dyn DiagnosticSink) -> Result<LiveState> {
    let config = &frozen.config;
    let matrix = normalize(records, config.fields(), &frozen.domains, config.data_policy(), sink)?;
    let stacks = stack(&matrix, &frozen.domains)?;
    let value_scale = ValueScale::new(stacks.max_total(), frozen.plot.height);
    let geometry = project(frozen, &stacks, &value_scale);
    Ok(LiveState { value_scale, stacks, geometry })
}

fn report(sink: &dyn DiagnosticSink, phase: Phase, frozen: &FrozenState, live: &LiveState) {
    sink.on_layout(&LayoutEvent {
        phase,
        series: frozen.domains.series.len(),
        categories: frozen.domains.categories.len(),
        max_total: live.value_scale.max_total(),
    });
}

/// Map stacked layers to plot-local pixel geometry.
fn project(frozen: &FrozenState, stacks: &Stacks, value_scale: &ValueScale) -> ChartGeometry {
    let FrozenState { config, domains, band_scale, plot } = frozen;

    let layers = stacks
        .layers()
        .iter()
        .enumerate()
        .map(|(i, layer)| LayerGroup {
            id: GroupId(i),
            series: layer.series.clone(),
            bars: layer
                .points
                .iter()
                .enumerate()
                .filter_map(|(c, point)| {
                    band_scale.band(c).map(|band| BarGeometry {
                        category: point.category.clone(),
                        rect: bar_rect(point, band.x, band.width, plot.height, value_scale),
                    })
                })
                .collect(),
        })
        .collect();

    let labels = domains
        .categories
        .values()
        .iter()
        .enumerate()
        .filter_map(|(c, category)| {
            band_scale.band(c).map(|band| CategoryLabel {
                category: category.clone(),
                text: config.format_category(category),
                position: Point::new(band.center(), plot.height + LABEL_OFFSET),
            })
        })
        .collect();

    let gridlines = value_scale
        .ticks(config.tick_count())
        .into_iter()
        .enumerate()
        .map(|(i, tick)| {
            let y = plot.height - value_scale.scale(tick);
            Gridline {
                value: tick,
                y,
                span: (0.0, plot.width),
                label: config.format_value(tick),
                label_position: Point::new(plot.width + LABEL_OFFSET, y),
                // Ticks always start at zero.
                is_baseline: i == 0,
            }
        })
        .collect();

    ChartGeometry {
        origin: plot.origin,
        plot_width: plot.width,
        plot_height: plot.height,
        max_total: value_scale.max_total(),
        layers,
        labels,
        gridlines,
    }
}

/// Rectangle for one stacked point. Negative heights extend downward from
/// the baseline instead of producing a negative-height rectangle.
fn bar_rect(point: &LayerPoint, x: f32, width: f32, plot_height: f32, value_scale: &ValueScale) -> Rect {
    let low = point.baseline.min(point.top());
    let high = point.baseline.max(point.top());
    let top = value_scale.scale(high);
    Rect::new(x, plot_height - top, width, top - value_scale.scale(low))
}
