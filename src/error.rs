//! Error types for stackviz operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a chart.
///
/// Only [`Error::Config`] and [`Error::State`] are reachable under the
/// default lenient data policy. Everything else about the input degrades
/// to a valid (possibly sparse or empty) chart.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration field is missing or invalid.
    #[error("invalid configuration for '{field}': {message}")]
    Config {
        /// The configuration field at fault.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// Chart settings could not be parsed.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// An operation was invoked in the wrong lifecycle state.
    #[error("invalid chart state: {0}")]
    State(String),

    /// A record could not supply a configured field (strict policy only).
    #[error("record {record}: field '{field}' {reason}")]
    Data {
        /// Position of the record in the input sequence.
        record: usize,
        /// The configured field name.
        field: String,
        /// What was wrong with the field.
        reason: String,
    },

    /// Stack offsets could not be accumulated for a series.
    #[error("layer {series} does not span {categories} categories")]
    Layout {
        /// Series index in stacking order.
        series: usize,
        /// Expected number of categories.
        categories: usize,
    },

    /// I/O error (file output).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] value.
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Config { field, message: message.into() }
    }
}
