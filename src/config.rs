//! Pipeline configuration.
//!
//! Bucket and key names are a contract between the ingestion run that writes
//! artifacts and the inference run that reads them, so the defaults below
//! must not change. A JSON file may override them for local experiments.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::SplitConfig;
use crate::error::{PipelineError, Result};

/// Bucket holding the trained model.
pub const MODELS_BUCKET: &str = "local-ml-flow-models";
/// Bucket holding the dataset, the test partition and the score.
pub const DATA_BUCKET: &str = "local-ml-flow-data";
/// Raw CSV dataset key.
pub const DATASET_KEY: &str = "housing.csv";
pub const MODEL_KEY: &str = "model.joblib";
pub const X_TEST_KEY: &str = "x_test.joblib";
pub const Y_TEST_KEY: &str = "y_test.joblib";
pub const SCORE_KEY: &str = "score.txt";

/// Names and parameters shared by both workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub models_bucket: String,
    pub data_bucket: String,
    pub dataset_key: String,
    pub model_key: String,
    pub x_test_key: String,
    pub y_test_key: String,
    pub score_key: String,
    pub split: SplitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            models_bucket: MODELS_BUCKET.to_string(),
            data_bucket: DATA_BUCKET.to_string(),
            dataset_key: DATASET_KEY.to_string(),
            model_key: MODEL_KEY.to_string(),
            x_test_key: X_TEST_KEY.to_string(),
            y_test_key: Y_TEST_KEY.to_string(),
            score_key: SCORE_KEY.to_string(),
            split: SplitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::invalid_config(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&text)
    }

    /// Check that every name is usable and the split ratio is sane.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("models_bucket", &self.models_bucket),
            ("data_bucket", &self.data_bucket),
            ("dataset_key", &self.dataset_key),
            ("model_key", &self.model_key),
            ("x_test_key", &self.x_test_key),
            ("y_test_key", &self.y_test_key),
            ("score_key", &self.score_key),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(PipelineError::invalid_config(format!("{field} is empty")));
            }
        }
        self.split.validate()
    }
}
