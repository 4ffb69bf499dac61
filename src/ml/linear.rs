//! Ordinary least squares linear regression.
//!
//! Fits `y = X β + b` by minimizing the residual sum of squares.
//!
//! # Solver
//!
//! Features and labels are centered, the centered system is solved with a
//! singular value decomposition, and the intercept is recovered from the
//! means: `b = mean(y) - mean(X) · β`. Singular values below
//! `max(n, p) · ε · σ_max` are treated as zero, which yields the
//! minimum-norm solution when the system is rank deficient or has fewer rows
//! than features.
//!
//! # Examples
//!
//! ```
//! use local_ml_flow::ml::{FeatureMatrix, LinearModel};
//!
//! // y = 2x + 1
//! let x = FeatureMatrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
//! let y = [3.0, 5.0, 7.0, 9.0];
//!
//! let model = LinearModel::fit(&x, &y).unwrap();
//! assert!((model.coefficients()[0] - 2.0).abs() < 1e-9);
//! assert!((model.intercept() - 1.0).abs() < 1e-9);
//! ```

use log::{debug, error, info};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::ml::matrix::FeatureMatrix;

/// A fitted linear model: one coefficient per feature plus an intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build a model from known parameters.
    pub fn from_parameters(coefficients: Vec<f64>, intercept: f64) -> Self {
        LinearModel {
            coefficients,
            intercept,
        }
    }

    /// Fit ordinary least squares with an intercept.
    ///
    /// # Errors
    ///
    /// Returns a `Fit` error if the row counts differ, the input is empty or
    /// contains non-finite values, or the decomposition fails.
    pub fn fit(x: &FeatureMatrix, y: &[f64]) -> Result<Self> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err(PipelineError::fit(format!(
                "features have {n_samples} rows but labels have {}",
                y.len()
            )));
        }
        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::fit(format!(
                "cannot fit on empty input ({n_samples} rows, {n_features} features)"
            )));
        }
        if x.as_slice().iter().chain(y).any(|v| !v.is_finite()) {
            return Err(PipelineError::fit("input contains NaN or infinite values"));
        }

        let n = n_samples as f64;
        let x_mean: Vec<f64> = (0..n_features)
            .map(|j| x.rows().map(|row| row[j]).sum::<f64>() / n)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n;

        let mut centered = x.to_nalgebra();
        for (j, mean) in x_mean.iter().enumerate() {
            centered.column_mut(j).add_scalar_mut(-mean);
        }
        let y_centered = DVector::from_iterator(n_samples, y.iter().map(|v| v - y_mean));

        let svd = centered.svd(true, true);
        let max_singular = svd.singular_values.max();
        let cutoff = max_singular * f64::EPSILON * n_samples.max(n_features) as f64;
        debug!(
            "svd singular values: {:?}, cutoff {cutoff:e}",
            svd.singular_values.as_slice()
        );

        let beta = svd
            .solve(&y_centered, cutoff)
            .map_err(|e| PipelineError::fit(format!("least squares solve failed: {e}")))?;

        let coefficients: Vec<f64> = beta.iter().copied().collect();
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(LinearModel {
            coefficients,
            intercept,
        })
    }

    /// Coefficients in feature order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if x.n_cols() != self.coefficients.len() {
            return Err(PipelineError::fit(format!(
                "model expects {} features, got {}",
                self.coefficients.len(),
                x.n_cols()
            )));
        }

        Ok(x.rows()
            .map(|row| {
                row.iter()
                    .zip(&self.coefficients)
                    .map(|(v, b)| v * b)
                    .sum::<f64>()
                    + self.intercept
            })
            .collect())
    }
}

/// Train a linear model on the training partition.
pub fn train(x_train: &FeatureMatrix, y_train: &[f64]) -> Result<LinearModel> {
    info!("training linear regression on {} rows", x_train.n_rows());

    match LinearModel::fit(x_train, y_train) {
        Ok(model) => {
            info!(
                "model trained: coefficients {:?}, intercept {}",
                model.coefficients(),
                model.intercept()
            );
            Ok(model)
        }
        Err(e) => {
            error!("error while training the model - {e}");
            Err(e)
        }
    }
}
