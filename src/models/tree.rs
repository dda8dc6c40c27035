//! CART decision tree used by both tree ensembles
//!
//! Splits are found by sorting the node's rows on each candidate feature and
//! scanning left to right with running totals, never splitting between equal
//! values. Both criteria are computed from `(count, sum, sum of squares)`:
//! Gini assumes 0/1 targets, where impurity is `2p(1 - p)` with `p = sum / n`;
//! MSE is the node variance.

use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand_chacha::ChaCha8Rng;

use crate::error::{PipelineError, PipelineResult};

/// Impurity criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Binary Gini impurity; leaves predict the share of 1s
    Gini,
    /// Variance; leaves predict the mean target
    Mse,
}

/// Node statistics sufficient for either criterion
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: f64,
    sum: f64,
    sq_sum: f64,
}

impl Moments {
    fn push(&mut self, y: f64) {
        self.count += 1.0;
        self.sum += y;
        self.sq_sum += y * y;
    }

    fn minus(&self, other: &Moments) -> Moments {
        Moments {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sq_sum: self.sq_sum - other.sq_sum,
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0.0 {
            0.0
        } else {
            self.sum / self.count
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0.0 {
            return 0.0;
        }
        match criterion {
            Criterion::Gini => {
                let p = self.mean();
                2.0 * p * (1.0 - p)
            }
            Criterion::Mse => (self.sq_sum / self.count - self.mean().powi(2)).max(0.0),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits for a tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split; `None` tries all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// A fitted (or empty) CART tree stored as a node arena
#[derive(Debug, Clone)]
pub struct DecisionTree {
    params: TreeParams,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl DecisionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            importances: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Grow the tree on the given rows of `x` (duplicates allowed, as in a
    /// bootstrap sample). `rng` drives per-split feature sampling.
    pub fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &[f64],
        rows: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> PipelineResult<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::InvalidConfig(format!(
                "feature rows ({}) and targets ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        self.nodes.clear();
        self.importances = vec![0.0; x.ncols()];
        self.grow(x, y, rows.to_vec(), 0, rng);
        Ok(())
    }

    /// Returns the arena index of the created node
    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &[f64],
        rows: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let mut moments = Moments::default();
        for &r in &rows {
            moments.push(y[r]);
        }
        let impurity = moments.impurity(self.params.criterion);

        let should_stop = rows.len() < self.params.min_samples_split
            || rows.len() < 2 * self.params.min_samples_leaf
            || self.params.max_depth.is_some_and(|d| depth >= d)
            || impurity <= 1e-12;

        let split = if should_stop {
            None
        } else {
            self.find_best_split(x, y, &rows, &moments, impurity, rng)
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf {
                value: moments.mean(),
                n_samples: rows.len(),
            });
            return self.nodes.len() - 1;
        };

        self.importances[split.feature] += rows.len() as f64 * split.gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| x[[r, split.feature]] <= split.threshold);

        // Reserve the slot so children can be pushed after it
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: moments.mean(),
            n_samples: rows.len(),
        });

        let left = self.grow(x, y, left_rows, depth + 1, rng);
        let right = self.grow(x, y, right_rows, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        rows: &[usize],
        total: &Moments,
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match self.params.max_features {
            Some(k) if k < n_features => {
                let mut picked = sample(rng, n_features, k.max(1)).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..n_features).collect(),
        };

        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        for feature in candidates {
            let mut sorted_pairs: Vec<(f64, f64)> =
                rows.iter().map(|&r| (x[[r, feature]], y[r])).collect();
            sorted_pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left = Moments::default();
            for i in 0..n - 1 {
                left.push(sorted_pairs[i].1);

                let left_count = i + 1;
                let right_count = n - left_count;
                if left_count < min_leaf || right_count < min_leaf {
                    continue;
                }

                // Skip if this value equals the next (avoid splitting within same value)
                if (sorted_pairs[i].0 - sorted_pairs[i + 1].0).abs() < 1e-10 {
                    continue;
                }

                let right = total.minus(&left);
                let weighted_child = (left.count * left.impurity(self.params.criterion)
                    + right.count * right.impurity(self.params.criterion))
                    / total.count;
                let gain = parent_impurity - weighted_child;

                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (sorted_pairs[i].0 + sorted_pairs[i + 1].0) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Arena index of the leaf a sample lands in
    pub fn apply(&self, sample: ArrayView1<f64>) -> usize {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Overwrite the prediction stored in a leaf
    pub fn set_leaf_value(&mut self, leaf: usize, new_value: f64) {
        if let Some(Node::Leaf { value, .. }) = self.nodes.get_mut(leaf) {
            *value = new_value;
        }
    }

    fn leaf_value(&self, leaf: usize) -> f64 {
        match &self.nodes[leaf] {
            Node::Leaf { value, .. } => *value,
            Node::Split { .. } => 0.0,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::PreconditionViolation {
                operation: "predict with a decision tree",
                requires: "a fitted tree",
                current: "unfitted",
            });
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| self.leaf_value(self.apply(row)))
            .collect())
    }

    /// Impurity decrease per feature, normalized to sum to 1 (all zero for a
    /// single-leaf tree)
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.importances.len()]
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Samples that reached each leaf during fitting
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { n_samples, .. } => Some(*n_samples),
                Node::Split { .. } => None,
            })
            .collect()
    }
}
