//! Tabular data handling
//!
//! Datasets are loaded from delimited text files into typed columns, summarised
//! with descriptive statistics, and fed to an ordinary-least-squares fitter.

mod dataset;
pub mod regression;
pub mod stats;

pub use dataset::{Column, ColumnValues, Dataset};
pub use regression::{FitMetrics, LinearModel};
pub use stats::{describe, ColumnSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or computing over tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Column '{0}' not found in dataset.")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("Column '{column}' has a missing value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Columns have mismatched lengths: '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        found: usize,
        expected: usize,
    },

    #[error("Regression failed: {0}")]
    Regression(String),
}
