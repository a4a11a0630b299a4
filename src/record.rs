//! Input records.
//!
//! A [`Record`] is a flat mapping of field name to [`FieldValue`]. Charts read
//! three configured fields from each record: the category, the series, and the
//! measure.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A value stored in a record field.
///
/// Field values double as category and series keys, so they implement
/// `Eq`, `Hash` and `Ord` even though they may hold a float. Numbers are
/// compared by their total order, with `-0.0` folded into `0.0`.
///
/// Numbers are stored as `f64`, so every `i32` and `f32` key converts
/// exactly. Integer keys beyond 2^53 are not representable.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(untagged))]
pub enum FieldValue {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A missing value.
    Null,
}

impl FieldValue {
    /// Get as f64, or None if not a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice, or None if not text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Interpret the value as a measure.
    ///
    /// Numbers are narrowed to `f32` and text is parsed. Returns `None` for
    /// `Null`, unparseable text, and values that are not finite as `f32`.
    #[must_use]
    pub fn to_measure(&self) -> Option<f32> {
        let value = match self {
            FieldValue::Number(n) => *n as f32,
            FieldValue::Text(s) => s.trim().parse::<f32>().ok()?,
            FieldValue::Null => return None,
        };
        value.is_finite().then_some(value)
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Text(_) => 2,
        }
    }

    fn canonical(n: f64) -> f64 {
        if n == 0.0 {
            0.0
        } else if n.is_nan() {
            f64::NAN
        } else {
            n
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Number(n) => Self::canonical(*n).to_bits().hash(state),
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    /// Natural order: `Null < Number < Text`, numbers by value, text by bytes.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                Self::canonical(*a).total_cmp(&Self::canonical(*b))
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Number(f64::from(v))
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Number(f64::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// A flat mapping of field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(transparent))]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Get a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_value_conversions() {
        let num: FieldValue = 42.0f32.into();
        assert_eq!(num.as_f64(), Some(42.0));

        let text: FieldValue = "hello".into();
        assert_eq!(text.as_str(), Some("hello"));
        assert_eq!(text.as_f64(), None);
    }

    #[test]
    fn test_to_measure() {
        assert_eq!(FieldValue::Number(2.5).to_measure(), Some(2.5));
        assert_eq!(FieldValue::from(" 7 ").to_measure(), Some(7.0));
        assert_eq!(FieldValue::from("seven").to_measure(), None);
        assert_eq!(FieldValue::Null.to_measure(), None);
        assert_eq!(FieldValue::Number(f64::NAN).to_measure(), None);
        assert_eq!(FieldValue::Number(f64::INFINITY).to_measure(), None);
        assert_eq!(FieldValue::Number(1e300).to_measure(), None);
    }

    #[test]
    fn test_natural_order() {
        let mut values = vec![
            FieldValue::from("b"),
            FieldValue::Number(10.0),
            FieldValue::from("a"),
            FieldValue::Null,
            FieldValue::Number(2.0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Number(2.0),
                FieldValue::Number(10.0),
                FieldValue::from("a"),
                FieldValue::from("b"),
            ]
        );
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let mut set = HashSet::new();
        set.insert(FieldValue::Number(0.0));
        assert!(set.contains(&FieldValue::Number(-0.0)));
        assert_eq!(FieldValue::Number(0.0), FieldValue::Number(-0.0));
    }

    #[test]
    fn test_large_integer_keys_stay_distinct() {
        let a = FieldValue::from(16_777_216);
        let b = FieldValue::from(16_777_217);
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(b.to_string(), "16777217");

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.contains(&b));
    }

    #[test]
    fn test_number_and_text_differ() {
        assert_ne!(FieldValue::Number(1.0), FieldValue::from("1"));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(2.0).to_string(), "2");
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::from("Jan").to_string(), "Jan");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn test_record_builder() {
        let record = Record::new().with("x", "Jan").with("v", 5.0);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("x"), Some(&FieldValue::from("Jan")));
        assert_eq!(record.get("v").and_then(FieldValue::as_f64), Some(5.0));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_record_from_iter() {
        let record: Record = [("x", FieldValue::from("Feb")), ("v", FieldValue::from(2.0))]
            .into_iter()
            .collect();
        assert_eq!(record.get("x").and_then(FieldValue::as_str), Some("Feb"));
        assert!(!record.is_empty());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_records_deserialize() {
        let yaml = "- {x: Jan, y: A, v: 5}\n- {x: Feb, y: B, v: ~}\n";
        let records: Vec<Record> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("v"), Some(&FieldValue::Number(5.0)));
        assert_eq!(records[1].get("v"), Some(&FieldValue::Null));
    }
}
