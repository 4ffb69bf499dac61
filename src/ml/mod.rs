//! Numeric building blocks for the housing model.
//!
//! This module holds everything that works on numbers rather than text: the
//! dense [`FeatureMatrix`], the [`StandardScaler`] fitted on training rows, the
//! ordinary least squares [`LinearModel`], and the R² metric used to score it.

pub mod linear;
pub mod matrix;
pub mod metrics;
pub mod scaler;

pub use linear::{LinearModel, train};
pub use matrix::FeatureMatrix;
pub use metrics::{format_percentage, r2_score};
pub use scaler::StandardScaler;
