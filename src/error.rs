//! Error types for the pipeline.
//!
//! Every stage of the ingestion and inference workflows reports failures
//! through [`PipelineError`]. Stages log and return; nothing here retries or
//! substitutes defaults. The handlers in [`crate::handler`] are the only place
//! where an error is turned into a response.
//!
//! # Examples
//!
//! ```
//! use local_ml_flow::error::{PipelineError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PipelineError::missing_field("mainroad"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::storage::StorageError;

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required categorical column is absent from the dataset.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The label column is absent from the dataset.
    #[error("Missing target: {0}")]
    MissingTarget(String),

    /// Training input was unusable.
    #[error("Fit error: {0}")]
    Fit(String),

    /// Evaluation input was unusable.
    #[error("Computation error: {0}")]
    Computation(String),

    /// Object storage failures, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Corrupt or incompatible binary artifact.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed dataset (CSV syntax, non-numeric cells, too few rows).
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors outside of the storage layer (local files, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Create a new missing field error.
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        PipelineError::MissingField(field.into())
    }

    /// Create a new missing target error.
    pub fn missing_target<S: Into<String>>(field: S) -> Self {
        PipelineError::MissingTarget(field.into())
    }

    /// Create a new fit error.
    pub fn fit<S: Into<String>>(msg: S) -> Self {
        PipelineError::Fit(msg.into())
    }

    /// Create a new computation error.
    pub fn computation<S: Into<String>>(msg: S) -> Self {
        PipelineError::Computation(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        PipelineError::Serialization(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        PipelineError::Dataset(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PipelineError::Config(msg.into())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Dataset(format!("CSV parse failed: {err}"))
    }
}
