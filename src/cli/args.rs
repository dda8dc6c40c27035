//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{LoadOptions, PredictorConfig};
use crate::viz::ChartConfig;

/// bankconv - Explore a bank telemarketing dataset and predict conversion
#[derive(Parser, Debug)]
#[command(name = "bankconv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (delimited text with a header row)
    #[arg(short, long, default_value = "Bank.csv", global = true)]
    pub input: PathBuf,

    /// Field separator of the input file (single ASCII character)
    #[arg(long, default_value = ",", value_parser = validate_separator, global = true)]
    pub separator: u8,

    /// Number of rows to use for schema inference.
    /// Higher values improve type detection for ambiguous columns but may be slower.
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000", global = true)]
    pub infer_schema_length: usize,

    /// Directory for the distribution grid and ROC chart
    #[arg(long, default_value = "results", global = true)]
    pub results_dir: PathBuf,

    /// Directory for the four conversion chart sets
    #[arg(long, default_value = ".", global = true)]
    pub charts_dir: PathBuf,

    /// Fraction of rows held out for testing, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_size, global = true)]
    pub test_size: f64,

    /// Seed for the split and the tree ensembles
    #[arg(long, default_value = "42", global = true)]
    pub seed: u64,

    /// Trees in the random forest and stages in gradient boosting
    #[arg(long, default_value = "100", value_parser = validate_n_estimators, global = true)]
    pub n_estimators: usize,

    /// Number of random-forest features to report
    #[arg(long, default_value = "10", global = true)]
    pub top_features: usize,

    /// Chart width in pixels
    #[arg(long, default_value = "1500", global = true)]
    pub chart_width: u32,

    /// Chart height in pixels
    #[arg(long, default_value = "1000", global = true)]
    pub chart_height: u32,

    /// Write conversion stats, model scores and feature importance to this JSON file
    #[arg(long, global = true)]
    pub export_json: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Dataset overview, descriptive statistics and distribution histograms
    Describe,
    /// Train and evaluate the three classifiers
    Train,
    /// Render the conversion chart sets
    Plot,
    /// Describe, train and plot (default)
    All,
}

impl Cli {
    /// The subcommand to run; `all` when none was given
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::All)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            separator: self.separator,
            infer_schema_length: self.infer_schema_length,
        }
    }

    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            test_size: self.test_size,
            seed: self.seed,
            n_estimators: self.n_estimators,
            ..Default::default()
        }
    }

    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig::default().with_size(self.chart_width, self.chart_height)
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}

/// Validator for n_estimators parameter
fn validate_n_estimators(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("n_estimators must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for separator parameter
fn validate_separator(s: &str) -> Result<u8, String> {
    let sep = match s {
        "\\t" | "tab" => "\t",
        other => other,
    };
    match sep.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(format!("separator must be a single ASCII character, got '{}'", s)),
    }
}
