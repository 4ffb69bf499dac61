//! Train/test partitioning and feature scaling.

use log::{debug, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::table::Table;
use crate::dataset::{BOOLEAN_COLUMNS, TARGET_COLUMN};
use crate::error::{PipelineError, Result};
use crate::ml::{FeatureMatrix, StandardScaler};

/// Parameters of the train/test partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of rows held out for testing.
    pub test_ratio: f64,
    /// Seed of the row shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(PipelineError::invalid_config(format!(
                "test_ratio must be between 0 and 1, got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }

    /// Number of (train, test) rows for a dataset of `n_rows`.
    ///
    /// The test partition gets `ceil(n_rows * test_ratio)` rows and the train
    /// partition the rest, so no row is dropped.
    pub fn partition_sizes(&self, n_rows: usize) -> Result<(usize, usize)> {
        self.validate()?;

        let n_test = (n_rows as f64 * self.test_ratio).ceil() as usize;
        let n_train = n_rows.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(PipelineError::dataset(format!(
                "{n_rows} rows would leave an empty partition (n_train={n_train}, n_test={n_test})"
            )));
        }
        Ok((n_train, n_test))
    }
}

/// Scaled features and raw labels for both partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub x_train: FeatureMatrix,
    pub x_test: FeatureMatrix,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
    /// Scaler fitted on the training rows and applied to both partitions.
    pub scaler: StandardScaler,
}

/// Build the feature matrix from the boolean columns, in their fixed order.
pub fn feature_matrix(table: &Table) -> Result<FeatureMatrix> {
    let columns = BOOLEAN_COLUMNS
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<Vec<_>>>()?;
    FeatureMatrix::from_columns(&columns)
}

/// Read the `price` label vector.
pub fn label_vector(table: &Table) -> Result<Vec<f64>> {
    if table.column(TARGET_COLUMN).is_none() {
        return Err(PipelineError::missing_target(TARGET_COLUMN));
    }
    table.numeric_column(TARGET_COLUMN)
}

/// Shuffled row indices split into (train, test).
fn partition_indices(n_rows: usize, config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>)> {
    let (_, n_test) = config.partition_sizes(n_rows)?;

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Partition an encoded table into scaled train/test features and labels.
///
/// Rows are shuffled with a `StdRng` seeded from `config.seed`, so the same
/// input always yields the same partition. The scaler only sees the training
/// rows.
pub fn split(table: &Table, config: &SplitConfig) -> Result<SplitResult> {
    info!("splitting {} rows into train and test data", table.n_rows());

    split_inner(table, config).inspect_err(|e| {
        error!("error while splitting train and tests - {e}");
    })
}

fn split_inner(table: &Table, config: &SplitConfig) -> Result<SplitResult> {
    let y = label_vector(table)?;
    let x = feature_matrix(table)?;

    let (train_idx, test_idx) = partition_indices(x.n_rows(), config)?;
    debug!("train rows: {:?}, test rows: {:?}", train_idx, test_idx);

    let x_train = x.select_rows(&train_idx);
    let x_test = x.select_rows(&test_idx);
    let y_train = train_idx.iter().map(|&i| y[i]).collect();
    let y_test = test_idx.iter().map(|&i| y[i]).collect();

    info!("normalising features on {} training rows", x_train.n_rows());
    let mut scaler = StandardScaler::new();
    let x_train = scaler.fit_transform(&x_train)?;
    let x_test = scaler.transform(&x_test)?;

    Ok(SplitResult {
        x_train,
        x_test,
        y_train,
        y_test,
        scaler,
    })
}
