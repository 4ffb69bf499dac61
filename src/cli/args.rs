//! Command line argument parsing for the local-ml-flow CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// local-ml-flow - train and score a housing price regression on a local object store
#[derive(Parser, Debug, Clone)]
#[command(name = "local-ml-flow")]
#[command(about = "Train and score a housing price regression on a local object store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LocalMlFlowArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Root directory of the object store (one sub-directory per bucket)
    #[arg(
        long,
        value_name = "DIR",
        env = "LOCAL_ML_FLOW_STORAGE_ROOT",
        default_value = "local-ml-flow-storage"
    )]
    pub storage_root: PathBuf,

    /// Pipeline configuration file (JSON)
    #[arg(long, value_name = "FILE", env = "LOCAL_ML_FLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LocalMlFlowArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the ingestion handler: train the model and store it with the test data
    Ingest,

    /// Run the inference handler: score the stored model on the stored test data
    Infer,

    /// Upload a local CSV file as the dataset
    #[command(name = "upload-dataset")]
    UploadDataset(UploadDatasetArgs),

    /// Show a summary of the stored dataset
    Dataset,

    /// Print the stored score
    Score,

    /// Show the headers of the stored model and test data
    Artifacts,
}

/// Arguments for uploading the dataset
#[derive(Parser, Debug, Clone)]
pub struct UploadDatasetArgs {
    /// CSV file with a header row
    #[arg(value_name = "CSV")]
    pub csv_file: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
