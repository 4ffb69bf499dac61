use serde_json::json;
use tempfile::TempDir;

use local_ml_flow::artifact;
use local_ml_flow::config::PipelineConfig;
use local_ml_flow::error::{PipelineError, Result};
use local_ml_flow::handler::{LambdaContext, inference_handler, ingestion_handler};
use local_ml_flow::ml::{FeatureMatrix, LinearModel, format_percentage, r2_score};
use local_ml_flow::storage::{
    FileObjectStore, MemoryObjectStore, ObjectStore, StorageConfig, StorageError,
};
use local_ml_flow::workflow::{IngestionStage, IngestionWorkflow, infer, ingest};

const THREE_ROWS: &str = "price,mainroad,guestroom,basement,hotwaterheating,airconditioning,prefarea\n\
                          100000,yes,no,yes,no,yes,no\n\
                          200000,no,yes,yes,no,no,yes\n\
                          300000,yes,no,no,yes,yes,no\n";

/// A larger dataset whose price depends on the yes/no columns plus a small
/// deterministic wobble, with extra columns the pipeline must ignore.
fn housing_csv(n_rows: usize) -> String {
    let mut csv = String::from(
        "price,area,bedrooms,mainroad,guestroom,basement,hotwaterheating,airconditioning,prefarea,furnishingstatus\n",
    );
    for i in 0..n_rows {
        let flags: Vec<bool> = (0..6).map(|j| (i * (j + 3) + j) % (j + 2) == 0).collect();
        let weights = [40000.0, 15000.0, 25000.0, 10000.0, 60000.0, 30000.0];
        let price = 200000.0
            + flags
                .iter()
                .zip(weights)
                .map(|(&f, w)| if f { w } else { 0.0 })
                .sum::<f64>()
            + ((i * 37) % 11) as f64 * 1000.0;

        csv.push_str(&format!("{price},{},{}", 5000 + i * 10, 1 + i % 4));
        for flag in flags {
            csv.push_str(if flag { ",yes" } else { ",no" });
        }
        csv.push_str(",furnished\n");
    }
    csv
}

fn store_with_dataset(csv: &str) -> Result<MemoryObjectStore> {
    let store = MemoryObjectStore::new();
    store.put("local-ml-flow-data", "housing.csv", csv.as_bytes())?;
    Ok(store)
}

#[test]
fn three_row_dataset_ingests_and_writes_three_artifacts() -> Result<()> {
    let store = store_with_dataset(THREE_ROWS)?;

    let response = ingestion_handler(
        &json!({}),
        &LambdaContext::new("ingestion"),
        &store,
        &PipelineConfig::default(),
    );

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "success");
    assert!(store.exists("local-ml-flow-models", "model.joblib"));
    assert_eq!(
        store.keys("local-ml-flow-data")?,
        vec!["housing.csv", "x_test.joblib", "y_test.joblib"]
    );

    let x_test: FeatureMatrix = artifact::load(&store, "local-ml-flow-data", "x_test.joblib")?;
    let y_test: Vec<f64> = artifact::load(&store, "local-ml-flow-data", "y_test.joblib")?;
    assert_eq!(x_test.shape(), (1, 6));
    assert_eq!(y_test.len(), 1);
    assert!([100000.0, 200000.0, 300000.0].contains(&y_test[0]));
    Ok(())
}

#[test]
fn score_is_written_as_percentage_text() -> Result<()> {
    let store = MemoryObjectStore::new();
    let model = LinearModel::from_parameters(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0);
    let x_test = FeatureMatrix::from_rows(&[
        vec![100000.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        vec![200000.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        vec![150000.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ])?;
    let y_test = vec![110000.0, 190000.0, 160000.0];
    artifact::save(&store, "local-ml-flow-models", "model.joblib", &model)?;
    artifact::save(&store, "local-ml-flow-data", "x_test.joblib", &x_test)?;
    artifact::save(&store, "local-ml-flow-data", "y_test.joblib", &y_test)?;

    let response = inference_handler(
        &json!({}),
        &LambdaContext::new("inference"),
        &store,
        &PipelineConfig::default(),
    );
    assert_eq!(response.status_code, 200);

    let stored = String::from_utf8(store.get("local-ml-flow-data", "score.txt")?).unwrap();
    assert_eq!(stored, "90.81632653061224%");
    assert_eq!(
        r2_score(&y_test, &model.predict(&x_test)?)?,
        0.9081632653061225
    );
    Ok(())
}

#[test]
fn three_row_dataset_scores_nan_on_its_single_test_row() -> Result<()> {
    let store = store_with_dataset(THREE_ROWS)?;
    let config = PipelineConfig::default();

    ingest(&store, &config)?;
    let report = infer(&store, &config)?;

    assert_eq!(report.test_rows, 1);
    assert!(report.r2.is_nan());
    let stored = String::from_utf8(store.get("local-ml-flow-data", "score.txt")?).unwrap();
    assert_eq!(stored, "nan%");
    Ok(())
}

#[test]
fn missing_model_yields_500_with_not_found_message() -> Result<()> {
    let store = MemoryObjectStore::new();

    let response = inference_handler(
        &json!({}),
        &LambdaContext::new("inference"),
        &store,
        &PipelineConfig::default(),
    );

    assert_eq!(response.status_code, 500);
    assert!(response.body.contains("not found"));
    assert!(response.body.contains("local-ml-flow-models/model.joblib"));
    assert!(!store.exists("local-ml-flow-data", "score.txt"));
    Ok(())
}

#[test]
fn ingest_then_infer_on_realistic_dataset() -> Result<()> {
    let store = store_with_dataset(&housing_csv(100))?;
    let config = PipelineConfig::default();

    let ingestion = ingest(&store, &config)?;
    assert_eq!(ingestion.rows, 100);
    assert_eq!(ingestion.train_rows, 80);
    assert_eq!(ingestion.test_rows, 20);

    let inference = infer(&store, &config)?;
    assert_eq!(inference.test_rows, 20);
    assert!(inference.r2 > 0.8, "r2 was {}", inference.r2);

    let stored = String::from_utf8(store.get("local-ml-flow-data", "score.txt")?).unwrap();
    assert_eq!(stored, inference.score);
    assert_eq!(stored, format_percentage(inference.r2));
    Ok(())
}

#[test]
fn model_write_failure_leaves_no_test_data() -> Result<()> {
    let store = store_with_dataset(&housing_csv(20))?;
    store.deny_bucket("local-ml-flow-models");
    let config = PipelineConfig::default();

    let mut workflow = IngestionWorkflow::new(&store, &config);
    let err = workflow.run().unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Storage(StorageError::AccessDenied(_))
    ));
    assert_eq!(
        workflow.state().failed_stage(),
        Some(IngestionStage::PersistModel)
    );
    assert!(!store.exists("local-ml-flow-data", "x_test.joblib"));
    assert!(!store.exists("local-ml-flow-data", "y_test.joblib"));

    let response = ingestion_handler(
        &json!({}),
        &LambdaContext::new("ingestion"),
        &store,
        &config,
    );
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, err.to_string());
    Ok(())
}

#[test]
fn stored_model_predicts_like_the_trained_one() -> Result<()> {
    let store = store_with_dataset(&housing_csv(50))?;
    let config = PipelineConfig::default();

    let report = ingest(&store, &config)?;
    let model: LinearModel = artifact::load(&store, "local-ml-flow-models", "model.joblib")?;
    let x_test: FeatureMatrix = artifact::load(&store, "local-ml-flow-data", "x_test.joblib")?;

    let rebuilt = LinearModel::from_parameters(report.coefficients.clone(), report.intercept);
    assert_eq!(model.predict(&x_test)?, rebuilt.predict(&x_test)?);
    Ok(())
}

#[test]
fn repeated_ingestion_produces_identical_artifacts() -> Result<()> {
    let store = store_with_dataset(&housing_csv(40))?;
    let config = PipelineConfig::default();

    ingest(&store, &config)?;
    let first_x: FeatureMatrix = artifact::load(&store, "local-ml-flow-data", "x_test.joblib")?;
    let first_model: LinearModel = artifact::load(&store, "local-ml-flow-models", "model.joblib")?;

    ingest(&store, &config)?;
    let second_x: FeatureMatrix = artifact::load(&store, "local-ml-flow-data", "x_test.joblib")?;
    let second_model: LinearModel =
        artifact::load(&store, "local-ml-flow-models", "model.joblib")?;

    assert_eq!(first_x, second_x);
    assert_eq!(first_model, second_model);
    Ok(())
}

#[test]
fn file_store_runs_the_whole_pipeline() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileObjectStore::new(dir.path(), StorageConfig::default())?;
    store.put("local-ml-flow-data", "housing.csv", housing_csv(30).as_bytes())?;
    let config = PipelineConfig::default();
    let context = LambdaContext::new("pipeline");

    assert!(ingestion_handler(&json!({}), &context, &store, &config).is_success());
    assert!(inference_handler(&json!({}), &context, &store, &config).is_success());

    assert!(dir.path().join("local-ml-flow-models/model.joblib").is_file());
    let score = std::fs::read_to_string(dir.path().join("local-ml-flow-data/score.txt"))?;
    assert!(score.ends_with('%'));
    Ok(())
}

#[test]
fn custom_names_are_honoured_end_to_end() -> Result<()> {
    let config = PipelineConfig::from_json_str(
        r#"{"models_bucket": "models", "data_bucket": "data", "dataset_key": "houses.csv"}"#,
    )?;
    let store = MemoryObjectStore::new();
    store.put("data", "houses.csv", housing_csv(25).as_bytes())?;

    ingest(&store, &config)?;
    infer(&store, &config)?;

    assert!(store.exists("models", "model.joblib"));
    assert!(store.exists("data", "score.txt"));
    assert!(!store.exists("local-ml-flow-data", "score.txt"));
    Ok(())
}
