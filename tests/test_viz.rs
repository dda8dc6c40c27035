//! Rendering tests for the chart files

mod common;

use bankconv::models::{roc_curve, ModelKind};
use bankconv::pipeline::ModelRoc;
use bankconv::viz::{
    render_distributions, render_roc_curves, ChartConfig, ConversionVisualizer,
    CONTACT_FILE, CONVERSION_DISTRIBUTION_FILE, DEMOGRAPHIC_FILE, TEMPORAL_FILE,
};
use bankconv::PipelineError;
use common::{create_bank_dataframe, create_small_bank_dataframe};
use polars::prelude::*;
use tempfile::TempDir;

fn small_config() -> ChartConfig {
    ChartConfig::default().with_size(600, 400)
}

#[test]
fn test_plots_require_label_column() {
    let df = df! {
        "age" => [30i64, 40],
        "job" => ["admin.", "services"],
    }
    .unwrap();
    let dir = TempDir::new().unwrap();
    let viz = ConversionVisualizer::new(&df, small_config());

    let err = viz.render_all(dir.path()).unwrap_err();
    let missing = err.downcast_ref::<PipelineError>().unwrap();
    assert!(matches!(missing, PipelineError::MissingColumn { column } if column == "y"));
    assert!(!dir.path().join(CONVERSION_DISTRIBUTION_FILE).exists());
}

#[test]
fn test_render_all_writes_four_files() {
    let df = create_bank_dataframe(120, 4);
    let dir = TempDir::new().unwrap();
    let viz = ConversionVisualizer::new(&df, small_config());

    let paths = viz.render_all(dir.path()).unwrap();
    let expected = [
        CONVERSION_DISTRIBUTION_FILE,
        DEMOGRAPHIC_FILE,
        CONTACT_FILE,
        TEMPORAL_FILE,
    ];
    assert_eq!(paths.len(), expected.len());
    for (path, name) in paths.iter().zip(expected) {
        assert_eq!(path, &dir.path().join(name));
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}

#[test]
fn test_charts_with_partial_columns() {
    // No education, pdays, campaign or quarter: those panels stay blank
    let df = create_small_bank_dataframe().drop("campaign").unwrap();
    let dir = TempDir::new().unwrap();
    let viz = ConversionVisualizer::new(&df, small_config());

    assert!(viz.plot_demographic_analysis(dir.path()).unwrap().exists());
    assert!(viz.plot_contact_analysis(dir.path()).unwrap().exists());
}

#[test]
fn test_distribution_grid_draws_first_four_numeric_columns() {
    let df = df! {
        "age" => [30i64, 40, 50, 60],
        "job" => ["a", "b", "a", "b"],
        "balance" => [100.0f64, 250.0, 75.0, 400.0],
        "duration" => [120i64, 300, 45, 800],
        "campaign" => [1i64, 2, 1, 3],
        "pdays" => [999i64, 3, 999, 6],
    }
    .unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("distributions.png");

    let drawn = render_distributions(&df, &path, &small_config()).unwrap();
    assert_eq!(drawn, vec!["age", "balance", "duration", "campaign"]);
    assert!(path.exists());
}

#[test]
fn test_roc_chart_written() {
    let y = [0u8, 0, 1, 1, 0, 1];
    let scores = [0.1, 0.4, 0.35, 0.8, 0.2, 0.9];
    let curves = vec![ModelRoc {
        model: ModelKind::LogisticRegression,
        auc: 0.89,
        points: roc_curve(&y, &scores),
    }];
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roc_curves.png");

    render_roc_curves(&curves, &path, &small_config()).unwrap();
    assert!(path.exists());
}
