//! Scale functions for data-to-pixel mappings.
//!
//! A stacked bar chart needs two independent mappings:
//!
//! - [`BandScale`]: categories to contiguous pixel bands. Built once from the
//!   frozen category domain and never rebuilt.
//! - [`ValueScale`]: stack values `[0, max_total]` to pixel extents. Its
//!   domain follows the data and is recomputed on every build and update.
//!
//! Both are pure functions of their domain and range; neither caches results.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite. Any nonzero
    /// span is accepted, however small.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        let span = domain.1 - domain.0;
        if !(span.is_finite() && span != 0.0) {
            return Err(Error::config("value_scale", "domain must have a finite, nonzero span"));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Linear mapping from `[0, max_total]` to `[0, extent]` pixels.
///
/// With `max_total <= 0` the domain is degenerate: every value maps to 0
/// and there are no ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    max_total: f32,
    extent: f32,
    linear: Option<LinearScale>,
}

impl ValueScale {
    /// Create a value scale over `[0, max_total]` onto `[0, extent]`.
    #[must_use]
    pub fn new(max_total: f32, extent: f32) -> Self {
        let max_total = if max_total.is_finite() { max_total.max(0.0) } else { 0.0 };
        let linear = LinearScale::new((0.0, max_total), (0.0, extent)).ok();
        Self { max_total, extent, linear }
    }

    /// Upper end of the domain.
    #[must_use]
    pub fn max_total(&self) -> f32 {
        self.max_total
    }

    /// Pixel extent of the range.
    #[must_use]
    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// True if every value maps to zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.linear.is_none()
    }

    /// "Nice" tick values covering the domain, about `count` of them.
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        if self.is_degenerate() {
            return Vec::new();
        }
        nice_ticks(0.0, self.max_total, count)
    }
}

impl Scale<f32, f32> for ValueScale {
    fn scale(&self, value: f32) -> f32 {
        self.linear.map_or(0.0, |linear| linear.scale(value))
    }

    fn domain(&self) -> (f32, f32) {
        (0.0, self.max_total)
    }

    fn range(&self) -> (f32, f32) {
        (0.0, self.extent)
    }
}

/// Step between ticks for `count` ticks over `[min, max]`.
///
/// Steps are 1, 2 or 5 times a power of ten, whichever keeps the tick count
/// closest to `count`.
#[must_use]
pub fn tick_step(min: f32, max: f32, count: usize) -> f32 {
    step_f64(min, max, count) as f32
}

fn step_f64(min: f32, max: f32, count: usize) -> f64 {
    let span = f64::from(max) - f64::from(min);
    if !(span.is_finite() && span > 0.0) || count == 0 {
        return 0.0;
    }
    let count = count as f64;
    let mut step = 10f64.powf((span / count).log10().floor());
    let err = count / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

/// Tick values at multiples of [`tick_step`] inside `[min, max]`.
#[must_use]
pub fn nice_ticks(min: f32, max: f32, count: usize) -> Vec<f32> {
    let step = step_f64(min, max, count);
    if step <= 0.0 {
        return Vec::new();
    }
    let start = (f64::from(min) / step - 1e-9).ceil() as i64;
    let stop = (f64::from(max) / step + 1e-9).floor() as i64;
    // Multiply instead of accumulating so ticks stay exact.
    (start..=stop).map(|i| (i as f64 * step) as f32).collect()
}

/// One category's pixel band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Left edge.
    pub x: f32,
    /// Band width, inner padding already removed.
    pub width: f32,
}

impl Band {
    /// Horizontal midpoint.
    #[must_use]
    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Ordinal mapping from category positions to contiguous pixel bands.
///
/// The range `[0, extent)` is split into equal steps of `extent / len`. Each
/// band keeps `1 - padding` of its step, centered in it:
///
/// ```text
/// step  = extent / len
/// width = step * (1 - padding)
/// x(i)  = i * step + step * padding / 2
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    len: usize,
    extent: f32,
    padding: f32,
}

impl BandScale {
    /// Create a band scale for `len` categories over `[0, extent)`.
    ///
    /// # Errors
    ///
    /// Returns an error if padding is outside `[0, 1)`.
    pub fn new(len: usize, extent: f32, padding: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&padding) {
            return Err(Error::config("inner_padding", format!("must be in [0, 1), got {padding}")));
        }
        Ok(Self { len, extent: extent.max(0.0), padding })
    }

    /// Number of bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if there are no bands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between the left edges of neighboring bands.
    #[must_use]
    pub fn step(&self) -> f32 {
        if self.len == 0 {
            0.0
        } else {
            self.extent / self.len as f32
        }
    }

    /// Width of every band.
    #[must_use]
    pub fn bandwidth(&self) -> f32 {
        self.step() * (1.0 - self.padding)
    }

    /// Band for the category at `index`, if in range.
    #[must_use]
    pub fn band(&self, index: usize) -> Option<Band> {
        (index < self.len).then(|| {
            let step = self.step();
            Band { x: index as f32 * step + step * self.padding / 2.0, width: self.bandwidth() }
        })
    }
}

impl Scale<usize, f32> for BandScale {
    /// Left edge of the band, or 0 for out-of-range positions.
    fn scale(&self, index: usize) -> f32 {
        self.band(index).map_or(0.0, |band| band.x)
    }

    fn domain(&self) -> (usize, usize) {
        (0, self.len.saturating_sub(1))
    }

    fn range(&self) -> (f32, f32) {
        (0.0, self.extent)
    }
}

/// Color scale interpolating between fixed stops.
#[derive(Debug, Clone)]
pub struct ColorScale {
    colors: Vec<Rgba>,
    domain_min: f32,
    domain_max: f32,
}

impl ColorScale {
    /// Series palette: from light to dark purple across `series` layers.
    ///
    /// A single layer gets the light end.
    #[must_use]
    pub fn series_palette(series: usize) -> Self {
        let light = Rgba::rgb(0xBC, 0xBD, 0xDC);
        let dark = Rgba::rgb(0x75, 0x6B, 0xB1);
        let last = series.saturating_sub(1).max(1) as f32;
        Self { colors: vec![light, dark], domain_min: 0.0, domain_max: last }
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        let t = ((value - self.domain_min) / (self.domain_max - self.domain_min)).clamp(0.0, 1.0);

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let segment_count = self.colors.len() - 1;
        let segment = (t * segment_count as f32).floor() as usize;
        let segment = segment.min(segment_count - 1);

        let local_t = t * segment_count as f32 - segment as f32;

        self.colors[segment].lerp(self.colors[segment + 1], local_t)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (*self.colors.first().unwrap_or(&Rgba::BLACK), *self.colors.last().unwrap_or(&Rgba::WHITE))
    }
}
