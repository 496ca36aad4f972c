//! Typed failures for loading and analyzing trip data.
//!
//! [`FilterError`] covers bad user selections and is recoverable by asking
//! again. [`DataError`] covers a malformed dataset and ends the session.

use std::fmt;
use thiserror::Error;

/// The filter step that left a dataset without rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Month,
    Weekday,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Month => f.write_str("month"),
            FilterStage::Weekday => f.write_str("weekday"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("City code does not exist: {0}")]
    InvalidCityCode(String),
    /// The name is not a known city, or its data file could not be opened.
    #[error("{}", unknown_city_message(.city, .source_path.as_deref()))]
    UnknownCity {
        city: String,
        source_path: Option<String>,
    },
    #[error("{kind} index must be between 0 and {max}, got {index}")]
    InvalidIndex {
        kind: &'static str,
        index: usize,
        max: usize,
    },
    #[error("Unknown month: {0}")]
    UnknownMonth(String),
    #[error("Unknown day of week: {0}")]
    UnknownWeekday(String),
    #[error("No trips left after the {stage} filter")]
    EmptyResult { stage: FilterStage },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("Row {row}: unparseable start time '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Row {row}: '{value}' is not a number in column '{column}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Column '{0}' has no values")]
    NoValues(&'static str),
}

fn unknown_city_message(city: &str, source_path: Option<&str>) -> String {
    match source_path {
        Some(path) => format!("No data file for {city} at {path}"),
        None => format!("{city} is not in the list of cities"),
    }
}

/// Failure of [`crate::dataset::DatasetLoader::load`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Data(#[from] DataError),
}

impl LoadError {
    /// True when a different selection of filters could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LoadError::Filter(_))
    }
}
