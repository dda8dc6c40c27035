//! Error taxonomy for loading, analysis and model training

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist. The run is aborted before any analysis.
    #[error("Input file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    /// A column the operation depends on is absent from the table.
    #[error("Required column '{column}' not found in dataset")]
    MissingColumn { column: String },

    /// An operation was called before the stage it depends on was reached.
    #[error("Cannot {operation}: requires {requires} (current stage: {current})")]
    PreconditionViolation {
        operation: &'static str,
        requires: &'static str,
        current: &'static str,
    },

    /// The table has no rows to work with.
    #[error("Dataset is empty - at least one row is required")]
    EmptyDataset,

    /// A numeric feature column contains null values.
    #[error("Numeric column '{column}' contains {count} null value(s)")]
    MissingValues { column: String, count: usize },

    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error raised by the dataframe engine.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// True for the input-file-missing case, which the binary reports without
    /// running any analysis.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
