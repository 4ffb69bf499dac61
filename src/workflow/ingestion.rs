//! Ingestion: fetch the dataset, train the model, persist model and test data.

use std::fmt;

use log::{error, info};
use serde::Serialize;
use uuid::Uuid;

use crate::artifact;
use crate::config::PipelineConfig;
use crate::dataset::{Table, encode_boolean_columns, split};
use crate::error::Result;
use crate::ml::train;
use crate::storage::ObjectStore;
use crate::workflow::WorkflowState;

/// Stages of an ingestion run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStage {
    Fetch,
    Encode,
    Split,
    Train,
    PersistModel,
    PersistTestData,
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestionStage::Fetch => "fetch",
            IngestionStage::Encode => "encode",
            IngestionStage::Split => "split",
            IngestionStage::Train => "train",
            IngestionStage::PersistModel => "persist_model",
            IngestionStage::PersistTestData => "persist_test_data",
        };
        f.write_str(name)
    }
}

/// Summary of a successful ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionReport {
    pub run_id: String,
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// `bucket/key` of every artifact written, in write order.
    pub artifacts: Vec<String>,
}

/// One ingestion run against a store.
#[derive(Debug)]
pub struct IngestionWorkflow<'a> {
    store: &'a dyn ObjectStore,
    config: &'a PipelineConfig,
    run_id: Uuid,
    state: WorkflowState<IngestionStage>,
}

impl<'a> IngestionWorkflow<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a PipelineConfig) -> Self {
        IngestionWorkflow {
            store,
            config,
            run_id: Uuid::new_v4(),
            state: WorkflowState::Pending,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> &WorkflowState<IngestionStage> {
        &self.state
    }

    /// Execute every stage in order.
    pub fn run(&mut self) -> Result<IngestionReport> {
        info!("[{}] ingestion started", self.run_id);

        match self.execute() {
            Ok(report) => {
                self.state = WorkflowState::Done;
                info!("[{}] ingestion done", self.run_id);
                Ok(report)
            }
            Err(e) => {
                if let WorkflowState::Running(stage) = self.state {
                    error!("[{}] error while ingest at {stage} - {e}", self.run_id);
                    self.state = WorkflowState::Failed {
                        stage,
                        reason: e.to_string(),
                    };
                }
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: IngestionStage) {
        info!("[{}] stage {stage}", self.run_id);
        self.state = WorkflowState::Running(stage);
    }

    fn execute(&mut self) -> Result<IngestionReport> {
        let config = self.config;
        let store = self.store;

        self.enter(IngestionStage::Fetch);
        let body = store.get(&config.data_bucket, &config.dataset_key)?;
        let table = Table::from_csv_reader(body.as_slice())?;
        info!(
            "[{}] retrieved dataset with {} rows and {} columns",
            self.run_id,
            table.n_rows(),
            table.n_columns()
        );

        self.enter(IngestionStage::Encode);
        let housing = encode_boolean_columns(&table)?;

        self.enter(IngestionStage::Split);
        let parts = split(&housing, &config.split)?;

        self.enter(IngestionStage::Train);
        let model = train(&parts.x_train, &parts.y_train)?;

        self.enter(IngestionStage::PersistModel);
        artifact::save(store, &config.models_bucket, &config.model_key, &model)?;

        self.enter(IngestionStage::PersistTestData);
        artifact::save(store, &config.data_bucket, &config.x_test_key, &parts.x_test)?;
        artifact::save(store, &config.data_bucket, &config.y_test_key, &parts.y_test)?;

        Ok(IngestionReport {
            run_id: self.run_id.to_string(),
            rows: table.n_rows(),
            train_rows: parts.y_train.len(),
            test_rows: parts.y_test.len(),
            coefficients: model.coefficients().to_vec(),
            intercept: model.intercept(),
            artifacts: vec![
                format!("{}/{}", config.models_bucket, config.model_key),
                format!("{}/{}", config.data_bucket, config.x_test_key),
                format!("{}/{}", config.data_bucket, config.y_test_key),
            ],
        })
    }
}

/// Run a fresh ingestion workflow.
pub fn ingest(store: &dyn ObjectStore, config: &PipelineConfig) -> Result<IngestionReport> {
    IngestionWorkflow::new(store, config).run()
}
