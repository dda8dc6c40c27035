//! Dataset loader for delimited text files

use std::path::Path;

use polars::prelude::*;

use crate::error::{PipelineError, PipelineResult};
use crate::utils::{create_spinner, finish_with_success, finish_with_warning};

/// Options for reading the input file
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Field separator byte
    pub separator: u8,
    /// Rows used for schema inference (0 = full scan)
    pub infer_schema_length: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            infer_schema_length: 10000,
        }
    }
}

fn scan_csv(path: &Path, options: &LoadOptions) -> PipelineResult<LazyFrame> {
    if !path.is_file() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let schema_length = if options.infer_schema_length == 0 {
        None
    } else {
        Some(options.infer_schema_length)
    };

    let lf = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(options.separator)
        .with_infer_schema_length(schema_length)
        .finish()?;

    Ok(lf)
}

/// Load the whole file into memory.
///
/// Either the complete table is returned or an error; a partially read table
/// never escapes.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> PipelineResult<DataFrame> {
    let df = scan_csv(path, options)?.collect()?;
    Ok(df)
}

/// Load the dataset behind a spinner and report its shape.
///
/// Returns the frame together with `(rows, columns, estimated_memory_mb)`.
pub fn load_dataset_with_progress(
    path: &Path,
    options: &LoadOptions,
) -> PipelineResult<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner(&format!("Reading {}...", path.display()));
    let result = load_dataset(path, options);
    match result {
        Ok(df) => {
            if df.height() == 0 {
                finish_with_warning(&spinner, "File loaded but contains no rows");
            } else {
                finish_with_success(&spinner, "Data loaded successfully");
            }
            let (rows, cols) = df.shape();
            let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
            Ok((df, rows, cols, memory_mb))
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e)
        }
    }
}

/// Read only the header/schema of the file
pub fn get_column_names(path: &Path, options: &LoadOptions) -> PipelineResult<Vec<String>> {
    let schema = scan_csv(path, options)?.collect_schema()?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Per-column structural information about a loaded table
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// Shape, schema and missing-value overview of a loaded table
#[derive(Debug, Clone)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub memory_mb: f64,
}

impl DatasetOverview {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| ColumnInfo {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
                null_count: column.null_count(),
            })
            .collect();

        Self {
            rows: df.height(),
            columns,
            memory_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}
