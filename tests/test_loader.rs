//! Integration tests for dataset loading

mod common;

use bankconv::pipeline::{get_column_names, load_dataset, DatasetOverview, LoadOptions};
use bankconv::PipelineError;
use common::{create_small_bank_dataframe, create_temp_csv};
use std::path::Path;

#[test]
fn test_load_missing_file_reports_path() {
    let err = load_dataset(Path::new("/nonexistent/dir/Bank.csv"), &LoadOptions::default())
        .unwrap_err();

    match &err {
        PipelineError::NotFound { path } => {
            assert_eq!(path, Path::new("/nonexistent/dir/Bank.csv"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_load_directory_is_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = load_dataset(dir.path(), &LoadOptions::default()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_load_preserves_shape_and_column_order() {
    let mut df = create_small_bank_dataframe();
    let (_dir, path) = create_temp_csv(&mut df, b',');

    let loaded = load_dataset(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.shape(), (10, 9));

    let names: Vec<String> = loaded
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["age", "job", "marital", "contact", "month", "day_of_week", "duration", "campaign", "y"]
    );
}

#[test]
fn test_load_with_semicolon_separator() {
    let mut df = create_small_bank_dataframe();
    let (_dir, path) = create_temp_csv(&mut df, b';');

    let options = LoadOptions {
        separator: b';',
        ..Default::default()
    };
    let loaded = load_dataset(&path, &options).unwrap();
    assert_eq!(loaded.width(), 9);

    // The wrong separator collapses every row into a single column
    let collapsed = load_dataset(&path, &LoadOptions::default()).unwrap();
    assert_eq!(collapsed.width(), 1);
}

#[test]
fn test_numeric_columns_inferred() {
    let mut df = create_small_bank_dataframe();
    let (_dir, path) = create_temp_csv(&mut df, b',');

    let loaded = load_dataset(&path, &LoadOptions::default()).unwrap();
    assert!(loaded.column("age").unwrap().dtype().is_primitive_numeric());
    assert!(loaded.column("duration").unwrap().dtype().is_primitive_numeric());
    assert!(!loaded.column("job").unwrap().dtype().is_primitive_numeric());
}

#[test]
fn test_get_column_names_reads_header_only() {
    let mut df = create_small_bank_dataframe();
    let (_dir, path) = create_temp_csv(&mut df, b',');

    let names = get_column_names(&path, &LoadOptions::default()).unwrap();
    assert_eq!(names.len(), 9);
    assert_eq!(names.first().map(String::as_str), Some("age"));
    assert_eq!(names.last().map(String::as_str), Some("y"));
}

#[test]
fn test_overview_of_loaded_table() {
    let mut df = create_small_bank_dataframe();
    let (_dir, path) = create_temp_csv(&mut df, b',');

    let loaded = load_dataset(&path, &LoadOptions::default()).unwrap();
    let overview = DatasetOverview::from_frame(&loaded);
    assert_eq!(overview.rows, 10);
    assert_eq!(overview.columns.len(), 9);
    assert_eq!(overview.total_nulls(), 0);
}
