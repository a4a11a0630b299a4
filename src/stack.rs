//! Stack layout.
//!
//! Turns a [`LayerMatrix`] into cumulative (baseline, height) pairs. Layers are
//! stacked in series-domain order, bottom to top; they are never reordered by
//! magnitude, so a series keeps its position (and its color) across updates.
//!
//! For series `i` and category `c`:
//!
//! ```text
//! baseline(i, c) = Σ measure(j, c) for j < i
//! height(i, c)   = measure(i, c)
//! ```
//!
//! The running baseline is accumulated with trueno vectors, one SIMD add per
//! layer across all categories.

use trueno::Vector;

use crate::domain::Domains;
use crate::error::{Error, Result};
use crate::normalize::LayerMatrix;
use crate::record::FieldValue;

/// Vertical extent of one series within one category.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPoint {
    /// Category this point sits in.
    pub category: FieldValue,
    /// Sum of the measures of all layers below.
    pub baseline: f32,
    /// This layer's own measure.
    pub height: f32,
}

impl LayerPoint {
    /// `baseline + height`.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.baseline + self.height
    }
}

/// One series' points across the category domain.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedLayer {
    /// Series this layer belongs to.
    pub series: FieldValue,
    /// One point per category, in category-domain order.
    pub points: Vec<LayerPoint>,
}

/// All stacked layers of a chart, bottom to top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stacks {
    layers: Vec<StackedLayer>,
}

impl Stacks {
    /// Layers in stacking order.
    #[must_use]
    pub fn layers(&self) -> &[StackedLayer] {
        &self.layers
    }

    /// Topmost layer, whose tops are the stack totals.
    #[must_use]
    pub fn top_layer(&self) -> Option<&StackedLayer> {
        self.layers.last()
    }

    /// Stack total per category (the top layer's `baseline + height`).
    #[must_use]
    pub fn totals(&self) -> Vec<f32> {
        self.top_layer()
            .map(|layer| layer.points.iter().map(LayerPoint::top).collect())
            .unwrap_or_default()
    }

    /// Largest stack total, never below zero.
    ///
    /// This is the upper end of the value-scale domain.
    #[must_use]
    pub fn max_total(&self) -> f32 {
        let totals = self.totals();
        if totals.is_empty() {
            return 0.0;
        }
        Vector::from_vec(totals).max().unwrap_or(0.0).max(0.0)
    }

    /// True if there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Stack `matrix` in series-domain order.
///
/// # Errors
///
/// Returns [`Error::Layout`] if the matrix does not match the domains.
pub fn stack(matrix: &LayerMatrix, domains: &Domains) -> Result<Stacks> {
    let categories = domains.categories.values();
    if matrix.series_len() != domains.series.len() {
        return Err(Error::Layout { series: matrix.series_len(), categories: categories.len() });
    }

    let mut baseline = Vector::from_vec(vec![0.0f32; categories.len()]);
    let mut layers = Vec::with_capacity(matrix.series_len());

    for (i, (row, series)) in matrix.rows().iter().zip(domains.series.values()).enumerate() {
        if row.len() != categories.len() {
            return Err(Error::Layout { series: i, categories: categories.len() });
        }

        let points = categories
            .iter()
            .zip(baseline.as_slice())
            .zip(row)
            .map(|((category, &base), &height)| LayerPoint {
                category: category.clone(),
                baseline: base,
                height,
            })
            .collect();
        layers.push(StackedLayer { series: series.clone(), points });

        baseline = baseline
            .add(&Vector::from_vec(row.clone()))
            .map_err(|_| Error::Layout { series: i, categories: categories.len() })?;
    }

    Ok(Stacks { layers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataPolicy, FieldNames};
    use crate::diagnostics::NoopSink;
    use crate::domain::{CategoryDomain, SeriesDomain};
    use crate::normalize::normalize;
    use crate::record::Record;

    fn domains(categories: &[&str], series: &[&str]) -> Domains {
        Domains {
            categories: CategoryDomain::new(categories.iter().map(|c| FieldValue::from(*c))),
            series: SeriesDomain::new(series.iter().map(|s| FieldValue::from(*s))),
        }
    }

    fn point(category: &str, baseline: f32, height: f32) -> LayerPoint {
        LayerPoint { category: category.into(), baseline, height }
    }

    #[test]
    fn test_stack_example() {
        let fields =
            FieldNames { measure: "v".to_string(), category: "x".to_string(), series: "y".to_string() };
        let records = vec![
            Record::new().with("x", "Jan").with("y", "A").with("v", 5.0),
            Record::new().with("x", "Jan").with("y", "B").with("v", 3.0),
            Record::new().with("x", "Feb").with("y", "A").with("v", 2.0),
        ];
        let domains = Domains::derive(&records, &fields, DataPolicy::Lenient, &NoopSink).unwrap();
        let matrix = normalize(&records, &fields, &domains, DataPolicy::Lenient, &NoopSink).unwrap();
        let stacks = stack(&matrix, &domains).unwrap();

        let layers = stacks.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].series, FieldValue::from("A"));
        assert_eq!(layers[0].points, vec![point("Feb", 0.0, 2.0), point("Jan", 0.0, 5.0)]);
        assert_eq!(layers[1].series, FieldValue::from("B"));
        assert_eq!(layers[1].points, vec![point("Feb", 2.0, 0.0), point("Jan", 5.0, 3.0)]);
        assert_eq!(stacks.totals(), vec![2.0, 8.0]);
        assert!((stacks.max_total() - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_order_is_domain_order_not_magnitude() {
        let domains = domains(&["a"], &["small", "big"]);
        let matrix = LayerMatrix::from_rows(vec![vec![1.0], vec![100.0]]).unwrap();
        let stacks = stack(&matrix, &domains).unwrap();
        assert_eq!(stacks.layers()[0].series, FieldValue::from("small"));
        assert_eq!(stacks.layers()[1].points[0], point("a", 1.0, 100.0));
    }

    #[test]
    fn test_stack_empty() {
        let stacks = stack(&LayerMatrix::default(), &Domains::default()).unwrap();
        assert!(stacks.is_empty());
        assert!(stacks.top_layer().is_none());
        assert!(stacks.totals().is_empty());
        assert_eq!(stacks.max_total(), 0.0);
    }

    #[test]
    fn test_max_total_all_zero() {
        let domains = domains(&["a", "b"], &["s"]);
        let stacks = stack(&LayerMatrix::zeros(1, 2), &domains).unwrap();
        assert_eq!(stacks.max_total(), 0.0);
    }

    #[test]
    fn test_max_total_never_negative() {
        let domains = domains(&["a"], &["s"]);
        let matrix = LayerMatrix::from_rows(vec![vec![-4.0]]).unwrap();
        let stacks = stack(&matrix, &domains).unwrap();
        assert_eq!(stacks.totals(), vec![-4.0]);
        assert_eq!(stacks.max_total(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let domains = domains(&["a", "b"], &["s", "t"]);
        let matrix = LayerMatrix::zeros(1, 2);
        assert!(matches!(stack(&matrix, &domains), Err(Error::Layout { .. })));

        let matrix = LayerMatrix::zeros(2, 3);
        assert!(matches!(stack(&matrix, &domains), Err(Error::Layout { series: 0, .. })));
    }
}
