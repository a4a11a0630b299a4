//! Category and series domains.
//!
//! Both domains are derived once from the initialization records and never
//! change afterwards. The category domain is sorted in natural order; the
//! series domain keeps first-encounter order, which is also the stacking order
//! from bottom to top.

use std::collections::HashMap;

use crate::config::{DataPolicy, FieldNames};
use crate::diagnostics::{DiagnosticSink, DomainsEvent, RecordSkipped, SkipReason};
use crate::error::{Error, Result};
use crate::record::{FieldValue, Record};

/// An ordered set of distinct values with O(1) position lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OrderedSet {
    values: Vec<FieldValue>,
    positions: HashMap<FieldValue, usize>,
}

impl OrderedSet {
    fn from_values(values: Vec<FieldValue>) -> Self {
        let positions = values.iter().enumerate().map(|(i, v)| (v.clone(), i)).collect();
        Self { values, positions }
    }
}

/// The sorted, frozen set of categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDomain(OrderedSet);

/// The frozen set of series in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesDomain(OrderedSet);

macro_rules! domain_accessors {
    ($ty:ty, $what:literal) => {
        impl $ty {
            #[doc = concat!("The ", $what, " in domain order.")]
            #[must_use]
            pub fn values(&self) -> &[FieldValue] {
                &self.0.values
            }

            #[doc = concat!("Position of a ", $what, " value, if present.")]
            #[must_use]
            pub fn index_of(&self, value: &FieldValue) -> Option<usize> {
                self.0.positions.get(value).copied()
            }

            #[doc = concat!("Number of ", $what, " values.")]
            #[must_use]
            pub fn len(&self) -> usize {
                self.0.values.len()
            }

            #[doc = concat!("True if there are no ", $what, " values.")]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.values.is_empty()
            }
        }
    };
}

domain_accessors!(CategoryDomain, "category");
domain_accessors!(SeriesDomain, "series");

impl CategoryDomain {
    /// Build a category domain: deduplicated and sorted ascending.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = FieldValue>) -> Self {
        let mut values: Vec<FieldValue> = values.into_iter().collect();
        values.sort();
        values.dedup();
        Self(OrderedSet::from_values(values))
    }
}

impl SeriesDomain {
    /// Build a series domain: deduplicated, first occurrence wins.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = FieldValue>) -> Self {
        let mut seen = HashMap::new();
        let mut ordered = Vec::new();
        for value in values {
            if !seen.contains_key(&value) {
                seen.insert(value.clone(), ordered.len());
                ordered.push(value);
            }
        }
        Self(OrderedSet { values: ordered, positions: seen })
    }
}

/// Both frozen domains of a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domains {
    /// Sorted categories.
    pub categories: CategoryDomain,
    /// Series in stacking order.
    pub series: SeriesDomain,
}

impl Domains {
    /// Derive both domains from the initialization records.
    ///
    /// A record without the category or the series field contributes to
    /// neither domain. Under [`DataPolicy::Lenient`] it is reported to the
    /// sink and skipped; under [`DataPolicy::Strict`] it is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Data`] for a record missing a key field when the
    /// policy is strict.
    pub fn derive(
        records: &[Record],
        fields: &FieldNames,
        policy: DataPolicy,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self> {
        let mut categories = Vec::new();
        let mut series = Vec::new();
        let mut skipped = 0;

        for (index, record) in records.iter().enumerate() {
            let category = record.get(&fields.category);
            let series_value = record.get(&fields.series);
            let (Some(category), Some(series_value)) = (category, series_value) else {
                let missing = if category.is_none() { &fields.category } else { &fields.series };
                if policy == DataPolicy::Strict {
                    return Err(Error::Data {
                        record: index,
                        field: missing.clone(),
                        reason: "is missing".to_string(),
                    });
                }
                skipped += 1;
                sink.on_record_skipped(&RecordSkipped {
                    index,
                    reason: SkipReason::MissingField(missing.clone()),
                });
                continue;
            };
            categories.push(category.clone());
            series.push(series_value.clone());
        }

        let domains =
            Self { categories: CategoryDomain::new(categories), series: SeriesDomain::new(series) };

        sink.on_domains(&DomainsEvent {
            categories: domains.categories.len(),
            series: domains.series.len(),
            skipped,
        });

        Ok(domains)
    }

    /// True if either domain is empty, which makes the chart degenerate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }
}
