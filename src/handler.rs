//! Invocation entrypoints.
//!
//! These are the only place where a pipeline error turns into a response
//! instead of propagating: success answers `200` with body `"success"`, any
//! failure answers `500` with the error message as body.

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage::ObjectStore;
use crate::workflow::{infer, ingest};

/// Response returned to the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn success() -> Self {
        HandlerResponse {
            status_code: 200,
            body: "success".to_string(),
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        HandlerResponse {
            status_code: 500,
            body: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    fn from_result<T>(result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Invocation metadata handed to a handler alongside the event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaContext {
    pub function_name: String,
    pub request_id: String,
    pub invoked_at: DateTime<Utc>,
}

impl LambdaContext {
    /// Context for a local invocation of `function_name` with a fresh request id.
    pub fn new<S: Into<String>>(function_name: S) -> Self {
        LambdaContext {
            function_name: function_name.into(),
            request_id: Uuid::new_v4().to_string(),
            invoked_at: Utc::now(),
        }
    }
}

/// Run the ingestion workflow. The event is not inspected.
pub fn ingestion_handler(
    event: &Value,
    context: &LambdaContext,
    store: &dyn ObjectStore,
    config: &PipelineConfig,
) -> HandlerResponse {
    info!(
        "{} invoked (request {}, event {event})",
        context.function_name, context.request_id
    );

    let response = HandlerResponse::from_result(ingest(store, config));
    if !response.is_success() {
        error!("{} failed: {}", context.function_name, response.body);
    }
    response
}

/// Run the inference workflow. The event is not inspected.
pub fn inference_handler(
    event: &Value,
    context: &LambdaContext,
    store: &dyn ObjectStore,
    config: &PipelineConfig,
) -> HandlerResponse {
    info!(
        "{} invoked (request {}, event {event})",
        context.function_name, context.request_id
    );

    let response = HandlerResponse::from_result(infer(store, config));
    if !response.is_success() {
        error!("{} failed: {}", context.function_name, response.body);
    }
    response
}
