//! End-to-end tests for the stacked bar chart pipeline.
//!
//! Drives `StackedBarChart` through its public API only and checks the
//! stacking, domain and update properties callers rely on.
//!
//! Run: cargo test --test stacked_bar_test

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::rc::Rc;

use approx::assert_relative_eq;
use proptest::prelude::*;
use stackviz::diagnostics::{Diagnostic, SkipReason};
use stackviz::prelude::*;
use stackviz::render::Frame;

fn rec(x: &str, y: &str, v: f32) -> Record {
    Record::new().with("month", x).with("product", y).with("sales", v)
}

fn config() -> ChartConfigBuilder {
    ChartConfig::builder().measure_field("sales").category_field("month").series_field("product")
}

fn chart(records: &[Record]) -> StackedBarChart<RecordingRenderer> {
    let mut chart = StackedBarChart::new(RecordingRenderer::new());
    chart.initialize(&SurfaceSize::new(600, 400), config(), records).unwrap();
    chart
}

fn texts(values: &[&str]) -> Vec<FieldValue> {
    values.iter().map(|v| FieldValue::from(*v)).collect()
}

// ============================================================================
// Worked example
// ============================================================================

#[test]
fn example_domains_and_stacks() {
    let chart = chart(&[rec("Jan", "A", 5.0), rec("Jan", "B", 3.0), rec("Feb", "A", 2.0)]);

    let domains = chart.domains().unwrap();
    assert_eq!(domains.categories.values(), texts(&["Feb", "Jan"]).as_slice());
    assert_eq!(domains.series.values(), texts(&["A", "B"]).as_slice());

    let stacks = chart.live().unwrap().stacks();
    let summary: Vec<Vec<(f32, f32)>> = stacks
        .layers()
        .iter()
        .map(|layer| layer.points.iter().map(|p| (p.baseline, p.height)).collect())
        .collect();
    assert_eq!(summary, vec![vec![(0.0, 2.0), (0.0, 5.0)], vec![(2.0, 0.0), (5.0, 3.0)]]);
    assert_eq!(stacks.max_total(), 8.0);
}

#[test]
fn example_emits_one_group_per_series() {
    let chart = chart(&[rec("Jan", "A", 5.0), rec("Jan", "B", 3.0), rec("Feb", "A", 2.0)]);

    let [Frame::Render(geometry)] = chart.renderer().frames() else {
        panic!("expected exactly one render, got {:?}", chart.renderer().frames());
    };
    assert_eq!(geometry.layers.len(), 2);
    assert!(geometry.layers.iter().all(|layer| layer.bars.len() == 2));
    assert_eq!(geometry.labels.len(), 2);
    assert_eq!(geometry.gridlines.first().map(|g| g.is_baseline), Some(true));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn categories_sorted_series_in_encounter_order() {
    let chart = chart(&[
        rec("Mar", "zeta", 1.0),
        rec("Jan", "alpha", 1.0),
        rec("Feb", "zeta", 1.0),
        rec("Jan", "mid", 1.0),
    ]);
    let domains = chart.domains().unwrap();
    assert_eq!(domains.categories.values(), texts(&["Feb", "Jan", "Mar"]).as_slice());
    assert_eq!(domains.series.values(), texts(&["zeta", "alpha", "mid"]).as_slice());
}

#[test]
fn missing_combination_has_zero_height() {
    let chart = chart(&[rec("Jan", "A", 4.0), rec("Feb", "B", 6.0)]);
    let geometry = chart.geometry().unwrap();

    // A has no Feb record, B has no Jan record.
    let a_feb = &geometry.layers[0].bars[0];
    assert_eq!(a_feb.category, FieldValue::from("Feb"));
    assert_eq!(a_feb.rect.height, 0.0);
    let b_jan = &geometry.layers[1].bars[1];
    assert_eq!(b_jan.category, FieldValue::from("Jan"));
    assert_eq!(b_jan.rect.height, 0.0);
}

#[test]
fn numeric_categories_sort_numerically() {
    let records: Vec<Record> = [10.0, 2.0, 33.0]
        .into_iter()
        .map(|year| Record::new().with("month", year).with("product", "A").with("sales", 1.0))
        .collect();
    let chart = chart(&records);
    let labels: Vec<&str> =
        chart.geometry().unwrap().labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(labels, vec!["2", "10", "33"]);
}

#[test]
fn duplicate_pair_first_match_wins() {
    let sink = Rc::new(MemorySink::new());
    let mut chart = StackedBarChart::with_sink(RecordingRenderer::new(), Rc::clone(&sink));
    chart
        .initialize(&SurfaceSize::new(600, 400), config(), &[rec("Jan", "A", 5.0), rec("Jan", "A", 50.0)])
        .unwrap();

    assert_eq!(chart.live().unwrap().stacks().max_total(), 5.0);
    assert!(sink.events().iter().any(|e| matches!(e, Diagnostic::DuplicateKey(d) if d.index == 1)));
}

#[test]
fn numeric_text_measures_are_accepted() {
    let chart = chart(&[
        Record::new().with("month", "Jan").with("product", "A").with("sales", " 12.5 "),
        rec("Jan", "B", 2.5),
    ]);
    assert_relative_eq!(chart.live().unwrap().stacks().max_total(), 15.0);
}

#[test]
fn lenient_policy_reports_skips() {
    let sink = Rc::new(MemorySink::new());
    let mut chart = StackedBarChart::with_sink(RecordingRenderer::new(), Rc::clone(&sink));
    let records = vec![
        rec("Jan", "A", 1.0),
        Record::new().with("month", "Jan").with("sales", 9.0),
        Record::new().with("month", "Feb").with("product", "A"),
    ];
    chart.initialize(&SurfaceSize::new(600, 400), config(), &records).unwrap();

    let reasons: Vec<SkipReason> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Diagnostic::RecordSkipped(skip) => Some(skip.reason),
            _ => None,
        })
        .collect();
    assert!(reasons.contains(&SkipReason::MissingField("product".to_string())));
    assert!(reasons.contains(&SkipReason::MissingField("sales".to_string())));
    assert_eq!(chart.domains().unwrap().categories.len(), 2);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn update_before_initialize_fails() {
    let mut chart = StackedBarChart::new(RecordingRenderer::new());
    assert!(matches!(chart.update(&[rec("Jan", "A", 1.0)]), Err(Error::State(_))));
}

#[test]
fn empty_initialize_is_not_an_error() {
    let mut chart = StackedBarChart::new(RecordingRenderer::new());
    chart.initialize(&SurfaceSize::new(600, 400), config(), &[]).unwrap();
    assert!(chart.is_initialized());
    assert!(chart.renderer().frames().is_empty());
    assert!(chart.frozen().unwrap().band_scale().is_empty());
    assert!(chart.live().unwrap().value_scale().is_degenerate());
}

#[test]
fn config_errors_abort_before_emission() {
    for builder in [
        ChartConfig::builder().category_field("month").series_field("product"),
        ChartConfig::builder().measure_field("sales").series_field("product"),
        config().category_field("   "),
        config().tick_count(0),
    ] {
        let mut chart = StackedBarChart::new(RecordingRenderer::new());
        let result = chart.initialize(&SurfaceSize::new(600, 400), builder, &[rec("Jan", "A", 1.0)]);
        assert!(matches!(result, Err(Error::Config { .. })), "got {result:?}");
        assert!(chart.renderer().frames().is_empty());
    }
}

#[test]
fn update_ignores_unknown_domain_values() {
    let mut chart = chart(&[rec("Jan", "A", 1.0), rec("Feb", "B", 1.0)]);
    chart.update(&[rec("Dec", "A", 100.0), rec("Jan", "Z", 100.0), rec("Jan", "A", 2.0)]).unwrap();

    let domains = chart.domains().unwrap();
    assert_eq!(domains.categories.values(), texts(&["Feb", "Jan"]).as_slice());
    assert_eq!(domains.series.values(), texts(&["A", "B"]).as_slice());
    assert_eq!(chart.live().unwrap().stacks().max_total(), 2.0);
}

#[test]
fn reinitialize_picks_up_new_categories() {
    let mut chart = chart(&[rec("Jan", "A", 1.0)]);
    chart.initialize(&SurfaceSize::new(600, 400), config(), &[rec("Jan", "A", 1.0), rec("Dec", "A", 2.0)]).unwrap();

    assert_eq!(chart.domains().unwrap().categories.len(), 2);
    assert_eq!(chart.renderer().render_count(), 2);
    assert!(chart.renderer().frames().contains(&Frame::Clear));
}

#[test]
fn transitions_interpolate_between_states() {
    let mut chart = chart(&[rec("Jan", "A", 4.0), rec("Jan", "B", 4.0)]);
    chart.update(&[rec("Jan", "A", 8.0)]).unwrap();

    let transition = chart.renderer().transitions().last().unwrap();
    let a = &transition.layers[0].bars[0];
    assert_eq!(a.at(0.0), a.from);
    assert_eq!(a.at(1.0), a.to);
    let mid = a.at(0.5);
    assert_relative_eq!(mid.height, (a.from.height + a.to.height) / 2.0);
}

// ============================================================================
// SVG output
// ============================================================================

#[test]
fn svg_renderer_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.svg");

    let mut chart = StackedBarChart::new(SvgRenderer::new(600, 400));
    chart
        .initialize(&SurfaceSize::new(600, 400), config(), &[rec("Jan", "A", 5.0), rec("Jan", "B", 3.0), rec("Feb", "A", 2.0)])
        .unwrap();
    chart.update(&[rec("Feb", "B", 1.0)]).unwrap();

    let renderer = chart.into_renderer();
    assert_eq!(renderer.geometry().map(|g| g.max_total), Some(1.0));
    renderer.write_to_file(&path).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"<g id="layer-0""#));
    assert!(svg.contains(r#"<g id="layer-1""#));
    assert!(svg.contains(">Feb</text>"));
    assert!(svg.contains("translate(20,20)"));
}

// ============================================================================
// YAML settings
// ============================================================================

#[cfg(feature = "yaml")]
#[test]
fn yaml_settings_drive_initialize() {
    let settings = ChartSettings::parse_yaml(
        "measure_field: sales\ncategory_field: month\nseries_field: product\ninner_padding: 0.0\n",
    )
    .unwrap();

    let mut chart = StackedBarChart::new(RecordingRenderer::new());
    chart.initialize(&SurfaceSize::new(600, 400), settings, &[rec("Jan", "A", 1.0)]).unwrap();
    let band = chart.frozen().unwrap().band_scale();
    assert_relative_eq!(band.bandwidth(), 510.0);
}

// ============================================================================
// Property tests
// ============================================================================

fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((0u8..8, 0u8..5, 0.0f32..500.0), 1..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(c, s, v)| rec(&format!("m{c}"), &format!("p{s}"), v))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The top layer's baseline + height is the sum of the category's measures.
    #[test]
    fn prop_top_of_stack_is_column_sum(records in records_strategy()) {
        let chart = chart(&records);
        let stacks = chart.live().unwrap().stacks();
        let heights: Vec<f32> = stacks.layers().iter().flat_map(|l| l.points.iter().map(|p| p.height)).collect();
        let columns = stacks.totals().len();

        for (c, total) in stacks.totals().into_iter().enumerate() {
            let sum: f32 = heights.iter().skip(c).step_by(columns).sum();
            prop_assert!((total - sum).abs() <= 1e-2 * sum.max(1.0));
        }
    }

    /// Category domain is sorted and survives updates unchanged.
    #[test]
    fn prop_domains_sorted_and_frozen(initial in records_strategy(), next in records_strategy()) {
        let mut chart = chart(&initial);
        let before = chart.domains().cloned().unwrap();
        prop_assert!(before.categories.values().windows(2).all(|w| w[0] < w[1]));

        chart.update(&next).unwrap();
        prop_assert_eq!(chart.domains().unwrap(), &before);
    }

    /// Same records twice, same geometry twice.
    #[test]
    fn prop_update_idempotent(initial in records_strategy(), next in records_strategy()) {
        let mut chart = chart(&initial);
        chart.update(&next).unwrap();
        let first = chart.geometry().cloned();
        chart.update(&next).unwrap();
        prop_assert_eq!(chart.geometry().cloned(), first);
    }
}
