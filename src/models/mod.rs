//! Binary classifiers trained by the conversion predictor

pub mod boosting;
pub mod forest;
pub mod logistic;
pub mod metrics;
pub mod tree;

use std::fmt;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::PipelineResult;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use metrics::{roc_auc, roc_curve, ConfusionMatrix, RocPoint};

/// Probability above which a sample is predicted as converted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A binary classifier over a dense feature matrix with 0/1 targets
pub trait Classifier: Send + Sync {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()>;

    /// Probability of the positive class for each row
    fn predict_proba(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>>;

    fn predict(&self, x: &Array2<f64>) -> PipelineResult<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| u8::from(p > DECISION_THRESHOLD))
            .collect())
    }

    /// Normalized per-feature importances, when the model defines them
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// The three model families, in training order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogisticRegression,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
