//! Standardization of feature columns.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::ml::matrix::FeatureMatrix;

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// The standard score of a sample `x` is `z = (x - mean) / scale`, where
/// `scale` is the population standard deviation of the fitted column. A
/// column with zero variance gets a scale of `1.0`, so it is only centered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f64>>,
    /// Divisor of each feature (computed during fit).
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    /// Per-feature means, if fitted.
    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    /// Per-feature divisors, if fitted.
    pub fn scale(&self) -> Option<&[f64]> {
        self.scale.as_deref()
    }

    /// Compute per-feature mean and standard deviation.
    pub fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        let (n_rows, n_cols) = x.shape();
        if n_rows == 0 {
            return Err(PipelineError::dataset("cannot fit scaler on zero rows"));
        }

        let n = n_rows as f64;
        let mut mean = vec![0.0; n_cols];
        for row in x.rows() {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; n_cols];
        for row in x.rows() {
            for ((s, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2);
            }
        }

        let scale = var
            .into_iter()
            .map(|s| {
                let std = (s / n).sqrt();
                if std == 0.0 || !std.is_finite() { 1.0 } else { std }
            })
            .collect();

        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    /// Apply the fitted transform.
    pub fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Err(PipelineError::dataset("scaler is not fitted"));
        };
        if x.n_cols() != mean.len() {
            return Err(PipelineError::dataset(format!(
                "scaler was fitted on {} features, got {}",
                mean.len(),
                x.n_cols()
            )));
        }

        Ok(x.map_columns(|j, v| (v - mean[j]) / scale[j]))
    }

    /// Fit on `x` and transform it in one step.
    pub fn fit_transform(&mut self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.fit(x)?;
        self.transform(x)
    }
}
