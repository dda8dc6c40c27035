//! L2-regularized logistic regression fitted by Newton's method (IRLS)
//!
//! Minimizes `sum(log_loss) + ||w||^2 / (2C)`; the intercept is not
//! penalized. The objective is strictly convex, so the optimum is unique and
//! no random state is involved.

use ndarray::{s, Array1, Array2, Axis};

use super::boosting::sigmoid;
use super::Classifier;
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    coefficients: Array1<f64>,
    intercept: f64,
    n_iter: usize,
    fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0, 1000, 1e-6)
    }
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize, tol: f64) -> Self {
        Self {
            c,
            max_iter,
            tol,
            coefficients: Array1::zeros(0),
            intercept: 0.0,
            n_iter: 0,
            fitted: false,
        }
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Newton iterations used by the last fit
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

/// Prepend a column of ones
fn with_intercept(x: &Array2<f64>) -> Array2<f64> {
    let mut aug = Array2::ones((x.nrows(), x.ncols() + 1));
    aug.slice_mut(s![.., 1..]).assign(x);
    aug
}

/// Solve `A x = b` for a symmetric positive definite `A`
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Some(x)
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        if self.c <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "logistic regression C must be positive, got {}",
                self.c
            )));
        }

        let xa = with_intercept(x);
        let d = xa.ncols();
        let alpha = 1.0 / self.c;
        let mut w = Array1::<f64>::zeros(d);

        self.n_iter = 0;
        for iter in 0..self.max_iter {
            self.n_iter = iter + 1;
            let p = xa.dot(&w).mapv(sigmoid);

            let mut gradient = xa.t().dot(&(&p - y));
            let mut penalty = w.clone();
            penalty[0] = 0.0;
            gradient.scaled_add(alpha, &penalty);

            let weights = p.mapv(|pi| (pi * (1.0 - pi)).max(1e-12));
            let weighted = &xa * &weights.view().insert_axis(Axis(1));
            let mut hessian = xa.t().dot(&weighted);
            for i in 1..d {
                hessian[[i, i]] += alpha;
            }
            // Keeps the intercept row positive definite on degenerate data
            hessian[[0, 0]] += 1e-10;

            let step = cholesky_solve(&hessian, &gradient).ok_or_else(|| {
                PipelineError::InvalidConfig(
                    "logistic regression Hessian is not positive definite".to_string(),
                )
            })?;
            w -= &step;

            if step.iter().fold(0.0_f64, |m, v| m.max(v.abs())) < self.tol {
                break;
            }
        }

        self.intercept = w[0];
        self.coefficients = w.slice(s![1..]).to_owned();
        self.fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        if !self.fitted {
            return Err(PipelineError::PreconditionViolation {
                operation: "predict with logistic regression",
                requires: "a fitted model",
                current: "unfitted",
            });
        }
        if x.ncols() != self.coefficients.len() {
            return Err(PipelineError::InvalidConfig(format!(
                "model fitted on {} features, got {}",
                self.coefficients.len(),
                x.ncols()
            )));
        }
        Ok((x.dot(&self.coefficients) + self.intercept).mapv(sigmoid))
    }
}
