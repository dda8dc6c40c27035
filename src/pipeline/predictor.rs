//! Conversion predictor: turns the record table into a supervised problem,
//! trains the three classifier families and scores them.
//!
//! One instance walks `Unprocessed -> Preprocessed -> Trained -> Evaluated`.
//! Each operation checks its required stage up front and returns
//! `PreconditionViolation` instead of running on missing state.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::Serialize;

use super::columns::{DURATION, LABEL};
use super::encoding::LabelEncoder;
use super::scaling::StandardScaler;
use super::split::{stratified_split, SplitIndices};
use super::target::{column_to_string_vec, conversion_mask, positive_rate};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    metrics, Classifier, ConfusionMatrix, GradientBoosting, LogisticRegression, ModelKind,
    RandomForest, RocPoint,
};
use crate::utils::{create_progress_bar, finish_with_success};

/// Settings for preprocessing and the three models
#[derive(Debug, Clone, Serialize)]
pub struct PredictorConfig {
    pub test_size: f64,
    pub seed: u64,
    /// Trees in the forest and stages in the boosted ensemble
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub boosting_max_depth: usize,
    /// Inverse L2 strength of the logistic model
    pub logistic_c: f64,
    pub logistic_max_iter: usize,
    pub logistic_tol: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            n_estimators: 100,
            learning_rate: 0.1,
            boosting_max_depth: 3,
            logistic_c: 1.0,
            logistic_max_iter: 1000,
            logistic_tol: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unprocessed,
    Preprocessed,
    Trained,
    Evaluated,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Unprocessed => "unprocessed",
            Stage::Preprocessed => "preprocessed",
            Stage::Trained => "trained",
            Stage::Evaluated => "evaluated",
        }
    }
}

/// Output of `preprocess`: scaled matrices plus what was fitted to make them
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Feature columns in matrix order (label and duration removed)
    pub feature_names: Vec<String>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
    pub split: SplitIndices,
    /// One encoder per categorical feature column
    pub encoders: BTreeMap<String, LabelEncoder>,
    pub scaler: StandardScaler,
}

impl PreparedData {
    /// Percentage of converted rows in the training split
    pub fn train_positive_rate(&self) -> f64 {
        positive_rate(&self.y_train)
    }

    pub fn test_positive_rate(&self) -> f64 {
        positive_rate(&self.y_test)
    }
}

/// A fitted model with its test-set outputs
pub struct TrainedModel {
    pub kind: ModelKind,
    pub model: Box<dyn Classifier>,
    pub predictions: Vec<u8>,
    pub probabilities: Array1<f64>,
    pub auc: f64,
}

/// Test-set scores for one model
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    pub model: ModelKind,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub auc: f64,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// ROC curve of one model on the test split
#[derive(Debug, Clone)]
pub struct ModelRoc {
    pub model: ModelKind,
    pub auc: f64,
    pub points: Vec<RocPoint>,
}

/// Encode every feature column of `df` into a dense matrix.
///
/// Numeric columns are cast to f64 and must be null-free; every other column
/// is label-encoded with its own encoder fitted on the full column.
pub fn build_feature_matrix(
    df: &DataFrame,
) -> PipelineResult<(Vec<String>, Array2<f64>, BTreeMap<String, LabelEncoder>)> {
    let n_rows = df.height();
    let mut feature_names = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut encoders = BTreeMap::new();

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == LABEL || name == DURATION {
            continue;
        }

        let values: Vec<f64> = if column.dtype().is_primitive_numeric() || column.dtype().is_bool() {
            let null_count = column.null_count();
            if null_count > 0 {
                return Err(PipelineError::MissingValues {
                    column: name.to_string(),
                    count: null_count,
                });
            }
            let cast = column.cast(&DataType::Float64)?;
            cast.f64()?.into_no_null_iter().collect()
        } else {
            let raw = column_to_string_vec(column)?;
            let (encoder, codes) = LabelEncoder::fit_transform(&raw);
            encoders.insert(name.to_string(), encoder);
            codes.into_iter().map(|c| c as f64).collect()
        };

        feature_names.push(name.to_string());
        columns.push(values);
    }

    let mut matrix = Array2::<f64>::zeros((n_rows, columns.len()));
    for (j, values) in columns.iter().enumerate() {
        for (i, v) in values.iter().enumerate() {
            matrix[[i, j]] = *v;
        }
    }

    Ok((feature_names, matrix, encoders))
}

pub struct ConversionPredictor {
    df: DataFrame,
    config: PredictorConfig,
    stage: Stage,
    prepared: Option<PreparedData>,
    models: BTreeMap<ModelKind, TrainedModel>,
}

impl ConversionPredictor {
    pub fn new(df: &DataFrame, config: PredictorConfig) -> Self {
        Self {
            df: df.clone(),
            config,
            stage: Stage::Unprocessed,
            prepared: None,
            models: BTreeMap::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn prepared(&self) -> Option<&PreparedData> {
        self.prepared.as_ref()
    }

    /// Trained models keyed by family
    pub fn models(&self) -> &BTreeMap<ModelKind, TrainedModel> {
        &self.models
    }

    fn require(
        &self,
        operation: &'static str,
        minimum: Stage,
        requires: &'static str,
    ) -> PipelineResult<()> {
        if self.stage < minimum {
            return Err(PipelineError::PreconditionViolation {
                operation,
                requires,
                current: self.stage.as_str(),
            });
        }
        Ok(())
    }

    /// [`preprocess`](Self::preprocess) with the configured `test_size`
    pub fn preprocess_configured(&mut self) -> PipelineResult<&PreparedData> {
        self.preprocess(self.config.test_size)
    }

    /// Build labels and features, split with stratification, and scale with
    /// statistics from the training split only. Resets any trained models.
    pub fn preprocess(&mut self, test_size: f64) -> PipelineResult<&PreparedData> {
        let labels = conversion_mask(&self.df)?;
        if labels.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let (feature_names, features, encoders) = build_feature_matrix(&self.df)?;
        let split = stratified_split(&labels, test_size, self.config.seed)?;

        let raw_train = features.select(Axis(0), &split.train);
        let raw_test = features.select(Axis(0), &split.test);
        let (scaler, x_train) = StandardScaler::fit_transform(&raw_train)?;
        let x_test = scaler.transform(&raw_test)?;

        let y_train = split.train.iter().map(|&i| labels[i]).collect();
        let y_test = split.test.iter().map(|&i| labels[i]).collect();

        self.models.clear();
        self.stage = Stage::Preprocessed;
        Ok(self.prepared.insert(PreparedData {
            feature_names,
            x_train,
            x_test,
            y_train,
            y_test,
            split,
            encoders,
            scaler,
        }))
    }

    fn build_model(&self, kind: ModelKind) -> Box<dyn Classifier> {
        let cfg = &self.config;
        match kind {
            ModelKind::LogisticRegression => Box::new(LogisticRegression::new(
                cfg.logistic_c,
                cfg.logistic_max_iter,
                cfg.logistic_tol,
            )),
            ModelKind::RandomForest => Box::new(RandomForest::new(cfg.n_estimators, cfg.seed)),
            ModelKind::GradientBoosting => Box::new(GradientBoosting::new(
                cfg.n_estimators,
                cfg.learning_rate,
                cfg.boosting_max_depth,
                cfg.seed,
            )),
        }
    }

    /// Fit the logistic, bagged and boosted models on the training split and
    /// score each on the test split.
    pub fn train_models(&mut self) -> PipelineResult<()> {
        self.require("train models", Stage::Preprocessed, "preprocessed data")?;
        let prepared = self.prepared.as_ref().ok_or(PipelineError::PreconditionViolation {
            operation: "train models",
            requires: "preprocessed data",
            current: self.stage.as_str(),
        })?;

        let y_train = Array1::from_iter(prepared.y_train.iter().map(|&v| f64::from(v)));
        let pb = create_progress_bar(ModelKind::ALL.len() as u64, "Training models");

        let mut trained = BTreeMap::new();
        for kind in ModelKind::ALL {
            pb.set_message(format!("Training {}", kind));
            let mut model = self.build_model(kind);
            model.fit(&prepared.x_train, &y_train)?;

            let probabilities = model.predict_proba(&prepared.x_test)?;
            let predictions = model.predict(&prepared.x_test)?;
            let auc = metrics::roc_auc(&prepared.y_test, &probabilities.to_vec());

            trained.insert(
                kind,
                TrainedModel {
                    kind,
                    model,
                    predictions,
                    probabilities,
                    auc,
                },
            );
            pb.inc(1);
        }
        finish_with_success(&pb, "Trained 3 models");

        self.models = trained;
        self.stage = Stage::Trained;
        Ok(())
    }

    /// Accuracy, precision, recall and F1 from hard predictions, plus the AUC
    /// from training. Rows follow model training order.
    pub fn evaluate_models(&mut self) -> PipelineResult<Vec<EvaluationRecord>> {
        self.require("evaluate models", Stage::Trained, "trained models")?;
        let prepared = self.prepared.as_ref().ok_or(PipelineError::PreconditionViolation {
            operation: "evaluate models",
            requires: "trained models",
            current: self.stage.as_str(),
        })?;

        let records = self
            .models
            .values()
            .map(|trained| {
                let confusion =
                    ConfusionMatrix::from_predictions(&prepared.y_test, &trained.predictions);
                EvaluationRecord {
                    model: trained.kind,
                    accuracy: confusion.accuracy(),
                    precision: confusion.precision(),
                    recall: confusion.recall(),
                    f1: confusion.f1(),
                    auc: trained.auc,
                    confusion,
                }
            })
            .collect();

        self.stage = Stage::Evaluated;
        Ok(records)
    }

    /// Top `top_n` features of the random forest, most important first.
    /// Equal importances keep feature-matrix column order.
    pub fn feature_importance(&self, top_n: usize) -> PipelineResult<Vec<FeatureImportance>> {
        self.require("get feature importance", Stage::Trained, "trained models")?;

        let forest = self
            .models
            .get(&ModelKind::RandomForest)
            .ok_or(PipelineError::PreconditionViolation {
                operation: "get feature importance",
                requires: "a trained random forest",
                current: self.stage.as_str(),
            })?;
        let importances = forest.model.feature_importances().unwrap_or(&[]);
        let names = self
            .prepared
            .as_ref()
            .map(|p| p.feature_names.as_slice())
            .unwrap_or(&[]);

        let mut ranked: Vec<(usize, FeatureImportance)> = names
            .iter()
            .zip(importances.iter())
            .enumerate()
            .map(|(idx, (name, &importance))| {
                (
                    idx,
                    FeatureImportance {
                        feature: name.clone(),
                        importance,
                    },
                )
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.importance
                .partial_cmp(&a.1.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(ranked
            .into_iter()
            .take(top_n)
            .map(|(_, fi)| fi)
            .collect())
    }

    /// ROC curve per trained model on the test split
    pub fn roc_curves(&self) -> PipelineResult<Vec<ModelRoc>> {
        self.require("compute ROC curves", Stage::Trained, "trained models")?;
        let y_test = self
            .prepared
            .as_ref()
            .map(|p| p.y_test.as_slice())
            .unwrap_or(&[]);

        Ok(self
            .models
            .values()
            .map(|trained| ModelRoc {
                model: trained.kind,
                auc: trained.auc,
                points: metrics::roc_curve(y_test, &trained.probabilities.to_vec()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_bank() -> DataFrame {
        let n = 40;
        let age: Vec<i64> = (0..n).map(|i| 20 + i).collect();
        let job: Vec<&str> = (0..n)
            .map(|i| if i % 3 == 0 { "admin." } else if i % 3 == 1 { "technician" } else { "services" })
            .collect();
        let duration: Vec<i64> = (0..n).map(|i| 100 + 10 * i).collect();
        let y: Vec<&str> = (0..n).map(|i| if i >= 30 { "yes" } else { "no" }).collect();
        df!(
            "age" => age,
            "job" => job,
            "duration" => duration,
            "y" => y
        )
        .unwrap()
    }

    fn fast_config() -> PredictorConfig {
        PredictorConfig {
            n_estimators: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_stage_progression() {
        let df = small_bank();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        assert_eq!(predictor.stage(), Stage::Unprocessed);

        predictor.preprocess(0.2).unwrap();
        assert_eq!(predictor.stage(), Stage::Preprocessed);

        predictor.train_models().unwrap();
        assert_eq!(predictor.stage(), Stage::Trained);
        assert_eq!(predictor.models().len(), 3);

        let records = predictor.evaluate_models().unwrap();
        assert_eq!(predictor.stage(), Stage::Evaluated);
        let order: Vec<ModelKind> = records.iter().map(|r| r.model).collect();
        assert_eq!(order, ModelKind::ALL.to_vec());
    }

    #[test]
    fn test_duration_and_label_are_not_features() {
        let df = small_bank();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        let prepared = predictor.preprocess(0.2).unwrap();

        assert_eq!(prepared.feature_names, vec!["age", "job"]);
        assert_eq!(prepared.x_train.ncols(), 2);
        assert!(prepared.encoders.contains_key("job"));
        assert!(!prepared.encoders.contains_key("age"));
    }

    #[test]
    fn test_out_of_order_calls() {
        let df = small_bank();
        let mut predictor = ConversionPredictor::new(&df, fast_config());

        for err in [
            predictor.feature_importance(10).unwrap_err(),
            predictor.roc_curves().unwrap_err(),
            predictor.train_models().unwrap_err(),
            predictor.evaluate_models().unwrap_err(),
        ] {
            assert!(matches!(err, PipelineError::PreconditionViolation { .. }));
        }

        predictor.preprocess(0.2).unwrap();
        assert!(matches!(
            predictor.evaluate_models(),
            Err(PipelineError::PreconditionViolation { current: "preprocessed", .. })
        ));
    }

    #[test]
    fn test_preprocess_again_drops_models() {
        let df = small_bank();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        predictor.preprocess(0.2).unwrap();
        predictor.train_models().unwrap();

        predictor.preprocess(0.25).unwrap();
        assert_eq!(predictor.stage(), Stage::Preprocessed);
        assert!(predictor.models().is_empty());
        assert!(predictor.feature_importance(5).is_err());
    }

    #[test]
    fn test_missing_label_is_fatal() {
        let df = df!("age" => [30i64, 40, 50]).unwrap();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        assert!(matches!(
            predictor.preprocess(0.2),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_null_numeric_feature_rejected() {
        let df = df!(
            "age" => [Some(30i64), None, Some(50), Some(60)],
            "y" => ["no", "yes", "no", "yes"]
        )
        .unwrap();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        assert!(matches!(
            predictor.preprocess(0.5),
            Err(PipelineError::MissingValues { count: 1, .. })
        ));
    }

    #[test]
    fn test_feature_importance_sorted_and_limited() {
        let df = small_bank();
        let mut predictor = ConversionPredictor::new(&df, fast_config());
        predictor.preprocess(0.2).unwrap();
        predictor.train_models().unwrap();

        let top = predictor.feature_importance(1).unwrap();
        assert_eq!(top.len(), 1);
        // age alone separates the classes
        assert_eq!(top[0].feature, "age");

        let all = predictor.feature_importance(10).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].importance >= all[1].importance);
        assert!((all.iter().map(|f| f.importance).sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
