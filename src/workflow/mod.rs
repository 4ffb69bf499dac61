//! The two pipeline workflows.
//!
//! Both run their stages strictly in order and stop at the first failure.
//! Nothing is retried and no stage substitutes a default value; the error
//! that stopped the run is returned unchanged and recorded in the workflow
//! state.

pub mod inference;
pub mod ingestion;

use std::fmt;

pub use inference::{InferenceReport, InferenceStage, InferenceWorkflow, infer};
pub use ingestion::{IngestionReport, IngestionStage, IngestionWorkflow, ingest};

/// Progress of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState<S> {
    /// Created but not started.
    Pending,
    /// Executing the given stage.
    Running(S),
    /// Every stage completed.
    Done,
    /// The given stage failed with `reason`.
    Failed { stage: S, reason: String },
}

impl<S: Copy> WorkflowState<S> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed { .. })
    }

    /// Stage that failed, if the run failed.
    pub fn failed_stage(&self) -> Option<S> {
        match self {
            WorkflowState::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl<S: fmt::Display> fmt::Display for WorkflowState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Pending => write!(f, "pending"),
            WorkflowState::Running(stage) => write!(f, "running {stage}"),
            WorkflowState::Done => write!(f, "done"),
            WorkflowState::Failed { stage, reason } => write!(f, "failed at {stage}: {reason}"),
        }
    }
}
