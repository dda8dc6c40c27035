//! Conversion label extraction
//!
//! The outcome column holds free text; only the exact value `"yes"` counts
//! as a conversion. Everything else, nulls included, maps to 0.

use polars::prelude::*;

use super::columns::{LABEL, POSITIVE_LABEL};
use crate::error::{PipelineError, PipelineResult};

/// Convert a column to a Vec of Option<String> for comparison
pub(crate) fn column_to_string_vec(col: &Column) -> PolarsResult<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Binary conversion mask for a label column: 1 where the value is `"yes"`
pub fn conversion_mask_for(df: &DataFrame, label: &str) -> PipelineResult<Vec<u8>> {
    let column = df
        .column(label)
        .map_err(|_| PipelineError::missing_column(label))?;

    let mask = column_to_string_vec(column)?
        .iter()
        .map(|v| match v {
            Some(s) if s == POSITIVE_LABEL => 1,
            _ => 0,
        })
        .collect();

    Ok(mask)
}

/// Binary conversion mask for the standard `y` column
pub fn conversion_mask(df: &DataFrame) -> PipelineResult<Vec<u8>> {
    conversion_mask_for(df, LABEL)
}

/// Percentage of ones in a 0/1 vector (0.0 when empty)
pub fn positive_rate(labels: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let positives = labels.iter().filter(|&&v| v == 1).count();
    positives as f64 / labels.len() as f64 * 100.0
}
