//! Gradient-boosted regression trees on the log-loss
//!
//! Each stage fits an MSE tree to the residuals `y - p` and then replaces
//! every leaf value with the Newton step `sum(r) / sum(p * (1 - p))` over the
//! training rows in that leaf.

use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::tree::{Criterion, DecisionTree, TreeParams};
use super::Classifier;
use crate::error::{PipelineError, PipelineResult};

const PROBA_EPS: f64 = 1e-15;

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
    init_score: f64,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl GradientBoosting {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            seed,
            init_score: 0.0,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn n_stages(&self) -> usize {
        self.trees.len()
    }

    fn raw_scores(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        let mut scores = Array1::from_elem(x.nrows(), self.init_score);
        for tree in &self.trees {
            scores.scaled_add(self.learning_rate, &tree.predict(x)?);
        }
        Ok(scores)
    }
}

impl Classifier for GradientBoosting {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if self.n_estimators == 0 || self.learning_rate <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "gradient boosting needs n_estimators >= 1 and a positive learning rate (got {} and {})",
                self.n_estimators, self.learning_rate
            )));
        }

        let prior = (y.sum() / n_samples as f64).clamp(PROBA_EPS, 1.0 - PROBA_EPS);
        self.init_score = (prior / (1.0 - prior)).ln();
        self.trees.clear();

        let params = TreeParams {
            criterion: Criterion::Mse,
            max_depth: Some(self.max_depth),
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        };
        let rows: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut scores = Array1::from_elem(n_samples, self.init_score);
        let mut importance_totals = vec![0.0; x.ncols()];

        for _ in 0..self.n_estimators {
            let proba = scores.mapv(sigmoid);
            let residuals: Vec<f64> = y.iter().zip(proba.iter()).map(|(t, p)| t - p).collect();

            let mut tree = DecisionTree::new(params);
            tree.fit_rows(x, &residuals, &rows, &mut rng)?;

            // Newton step per leaf
            let mut numerators = std::collections::HashMap::<usize, (f64, f64)>::new();
            for (i, row) in x.rows().into_iter().enumerate() {
                let leaf = tree.apply(row);
                let entry = numerators.entry(leaf).or_insert((0.0, 0.0));
                entry.0 += residuals[i];
                entry.1 += proba[i] * (1.0 - proba[i]);
            }
            for (leaf, (num, den)) in numerators {
                let value = if den.abs() < 1e-150 { 0.0 } else { num / den };
                tree.set_leaf_value(leaf, value);
            }

            scores.scaled_add(self.learning_rate, &tree.predict(x)?);
            for (total, value) in importance_totals.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
            self.trees.push(tree);
        }

        let sum: f64 = importance_totals.iter().sum();
        if sum > 0.0 {
            for value in &mut importance_totals {
                *value /= sum;
            }
        }
        self.feature_importances = importance_totals;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::PreconditionViolation {
                operation: "predict with gradient boosting",
                requires: "a fitted ensemble",
                current: "unfitted",
            });
        }
        Ok(self.raw_scores(x)?.mapv(sigmoid))
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        if self.feature_importances.is_empty() {
            None
        } else {
            Some(&self.feature_importances)
        }
    }
}
