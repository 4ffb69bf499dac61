//! # local-ml-flow
//!
//! A small housing price regression pipeline running against an object store.
//!
//! - [`workflow::ingestion`] reads `housing.csv`, encodes the yes/no columns,
//!   splits and scales the rows, fits an ordinary least squares model and
//!   stores the model together with the held-out test data.
//! - [`workflow::inference`] loads those artifacts back, predicts the test
//!   labels and stores the R² score as a percentage string.
//! - [`handler`] wraps both as invocation entrypoints answering
//!   `{statusCode, body}`.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod handler;
pub mod ml;
pub mod storage;
pub mod workflow;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{PipelineError, Result};
    pub use crate::handler::{HandlerResponse, LambdaContext, inference_handler, ingestion_handler};
    pub use crate::storage::{FileObjectStore, MemoryObjectStore, ObjectStore, StorageConfig};
    pub use crate::workflow::{infer, ingest};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
