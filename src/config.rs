//! Chart configuration.
//!
//! [`ChartSettings`] is the plain-data part (field names, padding, margins),
//! loadable from YAML with the `yaml` feature. [`ChartConfigBuilder`] adds the
//! label formatters and validates everything eagerly into a [`ChartConfig`].

use std::fmt;

use crate::error::{Error, Result};
use crate::record::FieldValue;

/// Formats a category for its axis label.
pub type CategoryFormat = Box<dyn Fn(&FieldValue) -> String>;

/// Formats a value-axis tick for its gridline label.
pub type ValueFormat = Box<dyn Fn(f32) -> String>;

/// How the normalizer treats records that cannot supply a configured field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(rename_all = "lowercase"))]
pub enum DataPolicy {
    /// Skip malformed records and zero-fill their cells.
    #[default]
    Lenient,
    /// Fail with [`Error::Data`] on the first malformed record.
    Strict,
}

/// Space between the surface edges and the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "yaml", serde(default))]
pub struct Margins {
    /// Above the plot.
    pub top: f32,
    /// Right of the plot; gridline labels live here.
    pub right: f32,
    /// Below the plot; category labels live here.
    pub bottom: f32,
    /// Left of the plot.
    pub left: f32,
}

impl Margins {
    /// Same margin on every side.
    #[must_use]
    pub const fn uniform(margin: f32) -> Self {
        Self { top: margin, right: margin, bottom: margin, left: margin }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self { top: 20.0, right: 70.0, bottom: 30.0, left: 20.0 }
    }
}

fn default_inner_padding() -> f32 {
    0.1
}
fn default_tick_count() -> usize {
    5
}

/// Largest accepted `tick_count`.
pub const MAX_TICK_COUNT: usize = 1_000;

/// Serializable chart settings.
///
/// The three field names are optional here so that a partially written
/// settings file still parses; [`ChartConfigBuilder::build`] rejects any that
/// are missing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "yaml", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartSettings {
    /// Field holding the numeric measure.
    #[cfg_attr(feature = "yaml", serde(default))]
    pub measure_field: Option<String>,

    /// Field holding the category (x-axis band).
    #[cfg_attr(feature = "yaml", serde(default))]
    pub category_field: Option<String>,

    /// Field holding the series (stack layer).
    #[cfg_attr(feature = "yaml", serde(default))]
    pub series_field: Option<String>,

    /// Fraction of each band left empty between bars, in `[0, 1)`.
    #[cfg_attr(feature = "yaml", serde(default = "default_inner_padding"))]
    pub inner_padding: f32,

    /// Plot margins.
    #[cfg_attr(feature = "yaml", serde(default))]
    pub margins: Margins,

    /// Requested number of value-axis ticks, 1 to [`MAX_TICK_COUNT`].
    #[cfg_attr(feature = "yaml", serde(default = "default_tick_count"))]
    pub tick_count: usize,

    /// Malformed-record handling.
    #[cfg_attr(feature = "yaml", serde(default))]
    pub data_policy: DataPolicy,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            measure_field: None,
            category_field: None,
            series_field: None,
            inner_padding: default_inner_padding(),
            margins: Margins::default(),
            tick_count: default_tick_count(),
            data_policy: DataPolicy::default(),
        }
    }
}

#[cfg(feature = "yaml")]
impl ChartSettings {
    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the line number if parsing fails.
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_yaml(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }
}

/// The three configured field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// Measure field.
    pub measure: String,
    /// Category field.
    pub category: String,
    /// Series field.
    pub series: String,
}

/// Validated, immutable chart configuration.
pub struct ChartConfig {
    fields: FieldNames,
    inner_padding: f32,
    margins: Margins,
    tick_count: usize,
    data_policy: DataPolicy,
    category_format: CategoryFormat,
    value_format: ValueFormat,
}

impl fmt::Debug for ChartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartConfig")
            .field("fields", &self.fields)
            .field("inner_padding", &self.inner_padding)
            .field("margins", &self.margins)
            .field("tick_count", &self.tick_count)
            .field("data_policy", &self.data_policy)
            .finish_non_exhaustive()
    }
}

impl ChartConfig {
    /// Start a builder with default settings.
    #[must_use]
    pub fn builder() -> ChartConfigBuilder {
        ChartConfigBuilder::new()
    }

    /// Configured field names.
    #[must_use]
    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    /// Band inner padding.
    #[must_use]
    pub fn inner_padding(&self) -> f32 {
        self.inner_padding
    }

    /// Plot margins.
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Requested value-axis tick count.
    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// Malformed-record handling.
    #[must_use]
    pub fn data_policy(&self) -> DataPolicy {
        self.data_policy
    }

    /// Format a category label.
    #[must_use]
    pub fn format_category(&self, category: &FieldValue) -> String {
        (self.category_format)(category)
    }

    /// Format a value-axis label.
    #[must_use]
    pub fn format_value(&self, value: f32) -> String {
        (self.value_format)(value)
    }
}

/// Builder for [`ChartConfig`].
pub struct ChartConfigBuilder {
    settings: ChartSettings,
    category_format: Option<CategoryFormat>,
    value_format: Option<ValueFormat>,
}

impl fmt::Debug for ChartConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartConfigBuilder")
            .field("settings", &self.settings)
            .field("category_format", &self.category_format.is_some())
            .field("value_format", &self.value_format.is_some())
            .finish()
    }
}

impl Default for ChartConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChartSettings> for ChartConfigBuilder {
    fn from(settings: ChartSettings) -> Self {
        Self { settings, category_format: None, value_format: None }
    }
}

impl ChartConfigBuilder {
    /// Create a builder with default settings and no field names.
    #[must_use]
    pub fn new() -> Self {
        ChartSettings::default().into()
    }

    /// Set the measure field.
    #[must_use]
    pub fn measure_field(mut self, name: &str) -> Self {
        self.settings.measure_field = Some(name.to_string());
        self
    }

    /// Set the category field.
    #[must_use]
    pub fn category_field(mut self, name: &str) -> Self {
        self.settings.category_field = Some(name.to_string());
        self
    }

    /// Set the series field.
    #[must_use]
    pub fn series_field(mut self, name: &str) -> Self {
        self.settings.series_field = Some(name.to_string());
        self
    }

    /// Set the band inner padding.
    #[must_use]
    pub fn inner_padding(mut self, padding: f32) -> Self {
        self.settings.inner_padding = padding;
        self
    }

    /// Set the plot margins.
    #[must_use]
    pub fn margins(mut self, margins: Margins) -> Self {
        self.settings.margins = margins;
        self
    }

    /// Set the requested number of value-axis ticks.
    #[must_use]
    pub fn tick_count(mut self, count: usize) -> Self {
        self.settings.tick_count = count;
        self
    }

    /// Set the malformed-record policy.
    #[must_use]
    pub fn data_policy(mut self, policy: DataPolicy) -> Self {
        self.settings.data_policy = policy;
        self
    }

    /// Set the category label formatter.
    #[must_use]
    pub fn category_format(mut self, format: impl Fn(&FieldValue) -> String + 'static) -> Self {
        self.category_format = Some(Box::new(format));
        self
    }

    /// Set the value label formatter.
    #[must_use]
    pub fn value_format(mut self, format: impl Fn(f32) -> String + 'static) -> Self {
        self.value_format = Some(Box::new(format));
        self
    }

    /// The settings gathered so far.
    #[must_use]
    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a field name is missing or empty, the
    /// padding is outside `[0, 1)`, a margin is negative or not finite, or
    /// the tick count is zero.
    pub fn build(self) -> Result<ChartConfig> {
        let ChartSettings {
            measure_field,
            category_field,
            series_field,
            inner_padding,
            margins,
            tick_count,
            data_policy,
        } = self.settings;

        let fields = FieldNames {
            measure: required("measure_field", measure_field)?,
            category: required("category_field", category_field)?,
            series: required("series_field", series_field)?,
        };

        if !(0.0..1.0).contains(&inner_padding) {
            return Err(Error::config(
                "inner_padding",
                format!("must be in [0, 1), got {inner_padding}"),
            ));
        }

        let sides = [margins.top, margins.right, margins.bottom, margins.left];
        if sides.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(Error::config("margins", "must be finite and non-negative"));
        }

        if !(1..=MAX_TICK_COUNT).contains(&tick_count) {
            return Err(Error::config(
                "tick_count",
                format!("must be in 1..={MAX_TICK_COUNT}, got {tick_count}"),
            ));
        }

        Ok(ChartConfig {
            fields,
            inner_padding,
            margins,
            tick_count,
            data_policy,
            category_format: self.category_format.unwrap_or_else(|| Box::new(|c| c.to_string())),
            value_format: self.value_format.unwrap_or_else(|| Box::new(|v| v.to_string())),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(name) if !name.trim().is_empty() => Ok(name),
        Some(_) => Err(Error::config(field, "field name is empty")),
        None => Err(Error::config(field, "required field is missing")),
    }
}
