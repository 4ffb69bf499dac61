//! Command implementations for the local-ml-flow CLI.

use std::fs;
use std::time::Instant;

use chrono::DateTime;
use log::{debug, info};
use serde_json::{Value, json};

use crate::artifact;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::error::Result;
use crate::handler::{HandlerResponse, LambdaContext, inference_handler, ingestion_handler};
use crate::storage::{FileObjectStore, ObjectStore, StorageConfig};

/// Execute a CLI command and return the process exit code.
///
/// Handler commands exit with 1 when the handler answers 500; every other
/// failure is returned as an error.
pub fn execute_command(args: LocalMlFlowArgs) -> Result<i32> {
    let config = load_config(&args)?;
    let store = FileObjectStore::new(&args.storage_root, StorageConfig::default())?;
    debug!("object store rooted at {}", store.root().display());

    match &args.command {
        Command::Ingest => invoke("ingestion", ingestion_handler, &store, &config, &args),
        Command::Infer => invoke("inference", inference_handler, &store, &config, &args),
        Command::UploadDataset(upload_args) => {
            upload_dataset(upload_args, &store, &config, &args).map(|_| 0)
        }
        Command::Dataset => show_dataset(&store, &config, &args).map(|_| 0),
        Command::Score => show_score(&store, &config, &args).map(|_| 0),
        Command::Artifacts => show_artifacts(&store, &config, &args).map(|_| 0),
    }
}

fn load_config(args: &LocalMlFlowArgs) -> Result<PipelineConfig> {
    match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

type Handler = fn(&Value, &LambdaContext, &dyn ObjectStore, &PipelineConfig) -> HandlerResponse;

/// Invoke a handler with an empty event.
fn invoke(
    function: &str,
    handler: Handler,
    store: &dyn ObjectStore,
    config: &PipelineConfig,
    cli_args: &LocalMlFlowArgs,
) -> Result<i32> {
    let context = LambdaContext::new(function);
    let event = json!({});
    let start_time = Instant::now();

    let response = handler(&event, &context, store, config);

    let result = InvocationResult {
        function: context.function_name.clone(),
        request_id: context.request_id.clone(),
        status_code: response.status_code,
        body: response.body.clone(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    let message = if response.is_success() {
        format!("{function} succeeded")
    } else {
        format!("{function} failed")
    };
    output_result(&message, &result, cli_args)?;

    Ok(if response.is_success() { 0 } else { 1 })
}

/// Put a local CSV file into the data bucket under the dataset key.
fn upload_dataset(
    upload_args: &UploadDatasetArgs,
    store: &dyn ObjectStore,
    config: &PipelineConfig,
    cli_args: &LocalMlFlowArgs,
) -> Result<()> {
    let body = fs::read(&upload_args.csv_file)?;
    let table = Table::from_csv_reader(body.as_slice())?;

    store.put(&config.data_bucket, &config.dataset_key, &body)?;
    info!(
        "uploaded {} to {}/{}",
        upload_args.csv_file.display(),
        config.data_bucket,
        config.dataset_key
    );

    output_result(
        "Dataset uploaded",
        &UploadResult {
            bucket: config.data_bucket.clone(),
            key: config.dataset_key.clone(),
            bytes: body.len() as u64,
            row_count: table.n_rows(),
        },
        cli_args,
    )
}

fn show_dataset(
    store: &dyn ObjectStore,
    config: &PipelineConfig,
    cli_args: &LocalMlFlowArgs,
) -> Result<()> {
    let body = store.get(&config.data_bucket, &config.dataset_key)?;
    let summary = Table::from_csv_reader(body.as_slice())?.summary();

    output_result(
        "Dataset",
        &DatasetInfo {
            bucket: config.data_bucket.clone(),
            key: config.dataset_key.clone(),
            row_count: summary.row_count,
            columns: summary.columns,
        },
        cli_args,
    )
}

fn show_score(
    store: &dyn ObjectStore,
    config: &PipelineConfig,
    cli_args: &LocalMlFlowArgs,
) -> Result<()> {
    let body = store.get(&config.data_bucket, &config.score_key)?;

    output_result(
        "Stored score",
        &ScoreInfo {
            bucket: config.data_bucket.clone(),
            key: config.score_key.clone(),
            score: String::from_utf8_lossy(&body).into_owned(),
        },
        cli_args,
    )
}

/// Read the headers of the model and test data without decoding them.
fn show_artifacts(
    store: &dyn ObjectStore,
    config: &PipelineConfig,
    cli_args: &LocalMlFlowArgs,
) -> Result<()> {
    let locations = [
        (&config.models_bucket, &config.model_key),
        (&config.data_bucket, &config.x_test_key),
        (&config.data_bucket, &config.y_test_key),
    ];

    let mut artifacts = Vec::with_capacity(locations.len());
    for (bucket, key) in locations {
        let location = format!("{bucket}/{key}");
        if !store.exists(bucket, key) {
            artifacts.push(ArtifactEntry {
                location,
                status: "missing".to_string(),
                kind: None,
                version: None,
                created_at: None,
                payload_bytes: None,
            });
            continue;
        }

        let info = artifact::inspect(&store.get(bucket, key)?)?;
        artifacts.push(ArtifactEntry {
            location,
            status: "ok".to_string(),
            kind: Some(format!("{:?}", info.kind)),
            version: Some(info.version),
            created_at: DateTime::from_timestamp_millis(info.created_at).map(|t| t.to_rfc3339()),
            payload_bytes: Some(info.payload_len),
        });
    }

    output_result("Artifacts", &ArtifactListing { artifacts }, cli_args)
}
