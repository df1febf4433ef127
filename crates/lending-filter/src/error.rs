//! Error types for the lending-filter crate.
//!
//! Filtering itself never fails. These errors come from the editing surface
//! ([`FilterState::update`](crate::FilterState::update)), from name parsing,
//! and from loading a [`Catalog`](crate::Catalog).

use thiserror::Error;

/// Errors that can occur when editing filter state or loading configuration.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Filter field name is not one of the known state fields.
    #[error("unknown filter field: {0}")]
    UnknownField(String),

    /// Entity type name is not `products`, `students` or `orders`.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Date bound is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date for '{field}': {value}")]
    InvalidDate { field: &'static str, value: String },

    /// Year of study is not an integer.
    #[error("invalid year: {0}")]
    InvalidYear(String),

    /// Tri-state input is not `true`, `false` or empty.
    #[error("invalid value for '{field}': expected 'true', 'false' or empty, got {value}")]
    InvalidTriState { field: &'static str, value: String },

    /// Sort expression could not be parsed.
    #[error("invalid ordering '{0}': expected 'field', 'field:asc' or 'field:desc'")]
    InvalidOrdering(String),

    /// Catalog definition could not be deserialized.
    #[error("invalid catalog: {0}")]
    Config(String),
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for FilterError {
    fn from(err: serde_yaml::Error) -> Self {
        FilterError::Config(err.to_string())
    }
}

/// Result type for lending-filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
