//! Structured diagnostics for the chart pipeline.
//!
//! The pipeline never prints. Instead it reports what it absorbed or decided
//! through a [`DiagnosticSink`]: one method per event, every body defaulting to
//! a no-op, so a sink implements only the events it cares about.
//!
//! [`NoopSink`] is what a chart uses unless told otherwise. [`MemorySink`]
//! keeps every event in order, which is handy for tests and debugging views.

use std::cell::RefCell;

use crate::record::FieldValue;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Which pipeline pass produced a [`LayoutEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Full build from `initialize`.
    Initialize,
    /// Incremental pass from `update`.
    Update,
}

/// Why a record did not contribute a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The record lacks the named configured field.
    MissingField(String),
    /// The measure field is null, non-numeric, or not finite.
    NonNumericMeasure,
    /// The category is not part of the frozen category domain.
    UnknownCategory,
    /// The series is not part of the frozen series domain.
    UnknownSeries,
}

/// Emitted once the category and series domains have been derived.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainsEvent {
    /// Number of distinct categories.
    pub categories: usize,
    /// Number of distinct series.
    pub series: usize,
    /// Records that lacked a category or series field.
    pub skipped: usize,
}

/// Emitted when a record is absorbed by the lenient data policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSkipped {
    /// Position of the record in the input sequence.
    pub index: usize,
    /// What was wrong with it.
    pub reason: SkipReason,
}

/// Emitted when a record repeats an already-filled (category, series) pair.
///
/// The earlier record wins; the repeat is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct DuplicateKey {
    /// Position of the ignored record.
    pub index: usize,
    /// Category of the pair.
    pub category: FieldValue,
    /// Series of the pair.
    pub series: FieldValue,
}

/// Emitted at the end of a build or update pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutEvent {
    /// Which pass finished.
    pub phase: Phase,
    /// Number of stacked layers.
    pub series: usize,
    /// Number of categories per layer.
    pub categories: usize,
    /// Largest stack total, the upper end of the value domain.
    pub max_total: f32,
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Receiver for pipeline diagnostics.
pub trait DiagnosticSink {
    /// Domains were derived from the initialization records.
    fn on_domains(&self, _event: &DomainsEvent) {}

    /// A record was skipped or zero-filled.
    fn on_record_skipped(&self, _event: &RecordSkipped) {}

    /// A duplicate (category, series) pair was ignored.
    fn on_duplicate_key(&self, _event: &DuplicateKey) {}

    /// A layout pass finished.
    fn on_layout(&self, _event: &LayoutEvent) {}
}

/// A sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {}

/// Any event a [`MemorySink`] recorded.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Diagnostic {
    Domains(DomainsEvent),
    RecordSkipped(RecordSkipped),
    DuplicateKey(DuplicateKey),
    Layout(LayoutEvent),
}

/// A sink that records events in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.borrow().clone()
    }

    /// Removes and returns the recorded events.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.events.take()
    }

    /// Number of `RecordSkipped` events seen so far.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events.borrow().iter().filter(|e| matches!(e, Diagnostic::RecordSkipped(_))).count()
    }

    fn push(&self, event: Diagnostic) {
        self.events.borrow_mut().push(event);
    }
}

impl DiagnosticSink for MemorySink {
    fn on_domains(&self, event: &DomainsEvent) {
        self.push(Diagnostic::Domains(event.clone()));
    }

    fn on_record_skipped(&self, event: &RecordSkipped) {
        self.push(Diagnostic::RecordSkipped(event.clone()));
    }

    fn on_duplicate_key(&self, event: &DuplicateKey) {
        self.push(Diagnostic::DuplicateKey(event.clone()));
    }

    fn on_layout(&self, event: &LayoutEvent) {
        self.push(Diagnostic::Layout(event.clone()));
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::rc::Rc<S> {
    fn on_domains(&self, event: &DomainsEvent) {
        (**self).on_domains(event);
    }

    fn on_record_skipped(&self, event: &RecordSkipped) {
        (**self).on_record_skipped(event);
    }

    fn on_duplicate_key(&self, event: &DuplicateKey) {
        (**self).on_duplicate_key(event);
    }

    fn on_layout(&self, event: &LayoutEvent) {
        (**self).on_layout(event);
    }
}
