//! Random forest: bagged Gini trees with per-split feature sampling

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{Criterion, DecisionTree, TreeParams};
use super::Classifier;
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub seed: u64,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            min_samples_leaf: 1,
            seed,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn compute_feature_importances(&mut self, n_features: usize) {
        let mut totals = vec![0.0; n_features];
        for tree in &self.trees {
            for (total, value) in totals.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for value in &mut totals {
                *value /= sum;
            }
        }
        self.feature_importances = totals;
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if self.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig(
                "random forest needs at least one tree".to_string(),
            ));
        }

        let params = TreeParams {
            criterion: Criterion::Gini,
            max_depth: self.max_depth,
            min_samples_split: 2,
            min_samples_leaf: self.min_samples_leaf,
            max_features: Some(((n_features as f64).sqrt() as usize).max(1)),
        };
        let targets = y.as_slice().map(<[f64]>::to_vec).unwrap_or_else(|| y.to_vec());
        let base_seed = self.seed;

        // Each tree owns a seed derived from its index, so the result does not
        // depend on how rayon schedules the work
        let trees: PipelineResult<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let mut tree = DecisionTree::new(params);
                tree.fit_rows(x, &targets, &bootstrap, &mut rng)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.compute_feature_importances(n_features);
        Ok(())
    }

    /// Mean of the per-tree leaf probabilities
    fn predict_proba(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::PreconditionViolation {
                operation: "predict with the random forest",
                requires: "a fitted forest",
                current: "unfitted",
            });
        }

        let per_tree: PipelineResult<Vec<Array1<f64>>> =
            self.trees.par_iter().map(|tree| tree.predict(x)).collect();

        let mut sum = Array1::zeros(x.nrows());
        for prediction in per_tree? {
            sum += &prediction;
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        if self.feature_importances.is_empty() {
            None
        } else {
            Some(&self.feature_importances)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        // Class 1 when the first feature is large; second feature is noise
        let n = 60;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                if i % 2 == 0 { i as f64 * 0.1 } else { 10.0 + i as f64 * 0.1 }
            } else {
                ((i * 7) % 13) as f64
            }
        });
        let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
        (x, y)
    }

    #[test]
    fn test_forest_learns_separable_data() {
        let (x, y) = blobs();
        let mut forest = RandomForest::new(20, 42);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 20);
        let preds = forest.predict(&x).unwrap();
        let correct = preds.iter().zip(y.iter()).filter(|(p, t)| **p as f64 == **t).count();
        assert!(correct >= 57, "expected near-perfect fit, got {}/60", correct);
    }

    #[test]
    fn test_importances_favor_signal() {
        let (x, y) = blobs();
        let mut forest = RandomForest::new(30, 7);
        forest.fit(&x, &y).unwrap();

        let importances = forest.feature_importances().unwrap();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_same_seed_same_probabilities() {
        let (x, y) = blobs();
        let mut a = RandomForest::new(10, 3);
        let mut b = RandomForest::new(10, 3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_unfitted_forest() {
        let forest = RandomForest::new(5, 0);
        assert!(forest.predict_proba(&Array2::zeros((1, 2))).is_err());
        assert!(forest.feature_importances().is_none());
    }
}
