//! Sparse records to a dense layer matrix.
//!
//! Every (series, category) pair of the frozen domains gets a cell. Records
//! are indexed once per call by their composite (category, series) position,
//! so filling the matrix is linear in the number of records plus cells.
//!
//! # Lenient by default
//!
//! Under [`DataPolicy::Lenient`] a record that cannot supply a value is
//! reported to the [`DiagnosticSink`] and otherwise ignored, leaving its cell
//! at 0. This covers a missing category, series, or measure field and a
//! measure that is not a finite number. Records whose category or series is
//! outside the frozen domains are always ignored: domains never grow after
//! initialization, so re-initialize the chart to pick up new values.
//!
//! Duplicate (category, series) pairs are a caller error. They are not
//! rejected; the first record for a pair wins and later ones are reported.
//! A first record with a missing or non-numeric measure still wins, holding
//! the cell at 0.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::{DataPolicy, FieldNames};
use crate::diagnostics::{DiagnosticSink, DuplicateKey, RecordSkipped, SkipReason};
use crate::domain::Domains;
use crate::error::{Error, Result};
use crate::record::Record;

/// Dense `[series][category]` table of measures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerMatrix {
    rows: Vec<Vec<f32>>,
    categories: usize,
}

impl LayerMatrix {
    /// A matrix of zeros.
    #[must_use]
    pub fn zeros(series: usize, categories: usize) -> Self {
        Self { rows: vec![vec![0.0; categories]; series], categories }
    }

    /// Build from explicit rows; all rows must have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Layout`] naming the first row whose length differs
    /// from the first row's.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let categories = rows.first().map_or(0, Vec::len);
        if let Some(series) = rows.iter().position(|row| row.len() != categories) {
            return Err(Error::Layout { series, categories });
        }
        Ok(Self { rows, categories })
    }

    /// Measure at (series, category), if in bounds.
    #[must_use]
    pub fn get(&self, series: usize, category: usize) -> Option<f32> {
        self.rows.get(series).and_then(|row| row.get(category)).copied()
    }

    /// One row per series, in stacking order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Number of series rows.
    #[must_use]
    pub fn series_len(&self) -> usize {
        self.rows.len()
    }

    /// Number of category columns.
    #[must_use]
    pub fn category_len(&self) -> usize {
        self.categories
    }

    /// Column sums, one per category.
    #[must_use]
    pub fn column_totals(&self) -> Vec<f32> {
        let mut totals = vec![0.0; self.categories];
        for row in &self.rows {
            for (total, value) in totals.iter_mut().zip(row) {
                *total += value;
            }
        }
        totals
    }
}

/// Composite (category index, series index) lookup of measures.
///
/// Built in one pass over the records; the first record for a cell wins,
/// even when its measure is unusable.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    cells: HashMap<(usize, usize), f32>,
}

impl RecordIndex {
    /// Index `records` against the frozen domains.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Data`] under [`DataPolicy::Strict`] when a record
    /// lacks a configured field or carries a non-numeric measure.
    pub fn build(
        records: &[Record],
        fields: &FieldNames,
        domains: &Domains,
        policy: DataPolicy,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self> {
        let mut cells = HashMap::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let skip = |reason: SkipReason| sink.on_record_skipped(&RecordSkipped { index, reason });

            let (Some(category), Some(series)) =
                (record.get(&fields.category), record.get(&fields.series))
            else {
                let missing =
                    if record.get(&fields.category).is_none() { &fields.category } else { &fields.series };
                if policy == DataPolicy::Strict {
                    return Err(missing_field(index, missing));
                }
                skip(SkipReason::MissingField(missing.clone()));
                continue;
            };

            let Some(c) = domains.categories.index_of(category) else {
                skip(SkipReason::UnknownCategory);
                continue;
            };
            let Some(s) = domains.series.index_of(series) else {
                skip(SkipReason::UnknownSeries);
                continue;
            };

            // An unusable measure still claims its cell, as 0.
            let measure = match record.get(&fields.measure) {
                None => {
                    if policy == DataPolicy::Strict {
                        return Err(missing_field(index, &fields.measure));
                    }
                    skip(SkipReason::MissingField(fields.measure.clone()));
                    0.0
                }
                Some(value) => match value.to_measure() {
                    Some(measure) => measure,
                    None => {
                        if policy == DataPolicy::Strict {
                            return Err(Error::Data {
                                record: index,
                                field: fields.measure.clone(),
                                reason: format!("is not a finite number: {value:?}"),
                            });
                        }
                        skip(SkipReason::NonNumericMeasure);
                        0.0
                    }
                },
            };

            match cells.entry((c, s)) {
                Entry::Vacant(slot) => {
                    slot.insert(measure);
                }
                Entry::Occupied(_) => sink.on_duplicate_key(&DuplicateKey {
                    index,
                    category: category.clone(),
                    series: series.clone(),
                }),
            }
        }

        Ok(Self { cells })
    }

    /// Measure for a (category, series) position, if a record supplied one.
    #[must_use]
    pub fn get(&self, category: usize, series: usize) -> Option<f32> {
        self.cells.get(&(category, series)).copied()
    }

    /// Number of filled cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no record supplied a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn missing_field(record: usize, field: &str) -> Error {
    Error::Data { record, field: field.to_string(), reason: "is missing".to_string() }
}

/// Build the dense layer matrix for `records` over the frozen `domains`.
///
/// Cells without a matching record hold 0.
///
/// # Errors
///
/// Only under [`DataPolicy::Strict`]; see [`RecordIndex::build`].
pub fn normalize(
    records: &[Record],
    fields: &FieldNames,
    domains: &Domains,
    policy: DataPolicy,
    sink: &dyn DiagnosticSink,
) -> Result<LayerMatrix> {
    let index = RecordIndex::build(records, fields, domains, policy, sink)?;
    let categories = domains.categories.len();

    let rows = (0..domains.series.len())
        .map(|s| (0..categories).map(|c| index.get(c, s).unwrap_or(0.0)).collect())
        .collect();

    Ok(LayerMatrix { rows, categories })
}
