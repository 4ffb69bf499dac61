//! Dense row-major feature matrix.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Dense `f64` matrix stored row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Create a matrix from row-major data.
    pub fn new(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n_rows * n_cols {
            return Err(PipelineError::dataset(format!(
                "matrix of shape {n_rows}x{n_cols} needs {} values, got {}",
                n_rows * n_cols,
                data.len()
            )));
        }
        Ok(FeatureMatrix {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Create a matrix from a list of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(PipelineError::dataset(format!(
                    "row {i} has {} values, expected {n_cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), n_cols, data)
    }

    /// Build a matrix whose columns are the given vectors.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let n_rows = columns.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = columns.iter().position(|c| c.len() != n_rows) {
            return Err(PipelineError::dataset(format!(
                "column {bad} has {} values, expected {n_rows}",
                columns[bad].len()
            )));
        }
        let n_cols = columns.len();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for column in columns {
                data.push(column[i]);
            }
        }
        Self::new(n_rows, n_cols, data)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0 || self.n_cols == 0
    }

    /// Value at row `i`, column `j`. Panics when out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n_cols + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy the given rows, in the given order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        FeatureMatrix {
            n_rows: indices.len(),
            n_cols: self.n_cols,
            data,
        }
    }

    /// Apply `f(column, value)` to every cell.
    pub fn map_columns<F>(&self, f: F) -> FeatureMatrix
    where
        F: Fn(usize, f64) -> f64,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(idx, &v)| f(idx % self.n_cols.max(1), v))
            .collect();
        FeatureMatrix {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            data,
        }
    }

    pub(crate) fn to_nalgebra(&self) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_row_slice(self.n_rows, self.n_cols, &self.data)
    }
}
