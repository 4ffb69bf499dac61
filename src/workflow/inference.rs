//! Inference: load the model and test data, score the predictions.

use std::fmt;

use log::{error, info};
use serde::Serialize;
use uuid::Uuid;

use crate::artifact;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ml::{FeatureMatrix, LinearModel, format_percentage, r2_score};
use crate::storage::ObjectStore;
use crate::workflow::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceStage {
    LoadModel,
    LoadTestFeatures,
    LoadTestLabels,
    Predict,
    Evaluate,
    PersistScore,
}

impl fmt::Display for InferenceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InferenceStage::LoadModel => "load_model",
            InferenceStage::LoadTestFeatures => "load_test_features",
            InferenceStage::LoadTestLabels => "load_test_labels",
            InferenceStage::Predict => "predict",
            InferenceStage::Evaluate => "evaluate",
            InferenceStage::PersistScore => "persist_score",
        };
        f.write_str(name)
    }
}

/// Summary of a successful inference run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceReport {
    pub run_id: String,
    pub test_rows: usize,
    pub r2: f64,
    /// Text written to the score object, e.g. `"90.81632653061224%"`.
    pub score: String,
    pub location: String,
}

/// One inference run against a store.
#[derive(Debug)]
pub struct InferenceWorkflow<'a> {
    store: &'a dyn ObjectStore,
    config: &'a PipelineConfig,
    run_id: Uuid,
    state: WorkflowState<InferenceStage>,
}

impl<'a> InferenceWorkflow<'a> {
    pub fn new(store: &'a dyn ObjectStore, config: &'a PipelineConfig) -> Self {
        InferenceWorkflow {
            store,
            config,
            run_id: Uuid::new_v4(),
            state: WorkflowState::Pending,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> &WorkflowState<InferenceStage> {
        &self.state
    }

    pub fn run(&mut self) -> Result<InferenceReport> {
        info!("[{}] inference started", self.run_id);

        let result = self.execute();
        match &result {
            Ok(report) => {
                info!("[{}] inference done, score {}", self.run_id, report.score);
                self.state = WorkflowState::Done;
            }
            Err(e) => {
                if let WorkflowState::Running(stage) = self.state {
                    error!("[{}] error while infer at {stage} - {e}", self.run_id);
                    self.state = WorkflowState::Failed {
                        stage,
                        reason: e.to_string(),
                    };
                }
            }
        }
        result
    }

    fn enter(&mut self, stage: InferenceStage) {
        info!("[{}] stage {stage}", self.run_id);
        self.state = WorkflowState::Running(stage);
    }

    fn execute(&mut self) -> Result<InferenceReport> {
        let config = self.config;
        let store = self.store;

        self.enter(InferenceStage::LoadModel);
        let model: LinearModel = artifact::load(store, &config.models_bucket, &config.model_key)?;

        self.enter(InferenceStage::LoadTestFeatures);
        let x_test: FeatureMatrix = artifact::load(store, &config.data_bucket, &config.x_test_key)?;

        self.enter(InferenceStage::LoadTestLabels);
        let y_test: Vec<f64> = artifact::load(store, &config.data_bucket, &config.y_test_key)?;

        self.enter(InferenceStage::Predict);
        let y_pred = model.predict(&x_test)?;

        self.enter(InferenceStage::Evaluate);
        let r2 = r2_score(&y_test, &y_pred)?;
        let score = format_percentage(r2);

        self.enter(InferenceStage::PersistScore);
        store.put(&config.data_bucket, &config.score_key, score.as_bytes())?;

        Ok(InferenceReport {
            run_id: self.run_id.to_string(),
            test_rows: y_test.len(),
            r2,
            score,
            location: format!("{}/{}", config.data_bucket, config.score_key),
        })
    }
}

/// Run a fresh inference workflow.
pub fn infer(store: &dyn ObjectStore, config: &PipelineConfig) -> Result<InferenceReport> {
    InferenceWorkflow::new(store, config).run()
}
