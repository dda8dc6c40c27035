//! JSON export of one analysis run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ConversionStats, EvaluationRecord, FeatureImportance, PredictorConfig};

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Tool version
    pub version: String,
    /// Input file path
    pub input: String,
    pub test_size: f64,
    pub seed: u64,
    pub n_estimators: usize,
}

#[derive(Debug, Serialize)]
pub struct RunExport {
    pub metadata: RunMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionStats>,
    pub evaluations: Vec<EvaluationRecord>,
    pub feature_importance: Vec<FeatureImportance>,
}

impl RunExport {
    pub fn new(input: &Path, config: &PredictorConfig) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                input: input.display().to_string(),
                test_size: config.test_size,
                seed: config.seed,
                n_estimators: config.n_estimators,
            },
            conversion: None,
            evaluations: Vec::new(),
            feature_importance: Vec::new(),
        }
    }
}

/// Write the run as pretty-printed JSON
pub fn export_run(export: &RunExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export).context("Failed to serialize run to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run export to {}", output_path.display()))?;

    Ok(())
}
