//! Pipeline error taxonomy.

use crate::domain::compliance::{ExtractionError, NodeName};
use crate::domain::foundation::ThreadId;
use crate::ports::{AIError, CheckpointError};

/// Errors surfaced by pipeline nodes and the run coordinator
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Transient model failure that survived the provider's retries.
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(AIError),

    /// Model failure that retrying cannot fix (credentials, bad request).
    #[error("Language model request failed: {0}")]
    Model(AIError),

    /// The extractor's output did not satisfy the fact schema.
    #[error("Structured extraction failed: {0}")]
    SchemaValidationFailed(#[from] ExtractionError),

    /// The stored state of one thread cannot be read back.
    #[error("Checkpoint for thread {thread_id} is corrupt: {reason}")]
    CheckpointCorrupt { thread_id: ThreadId, reason: String },

    #[error("Checkpoint store error: {0}")]
    Storage(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(ThreadId),

    #[error("Run for thread {0} has already finished")]
    RunFinished(ThreadId),

    #[error("Thread {thread_id} is not waiting for input (next node: {node})")]
    InputNotExpected { thread_id: ThreadId, node: NodeName },

    #[error("User input must not be empty")]
    EmptyInput,

    /// The run state does not allow the requested node to run.
    #[error("Invalid run state: {0}")]
    InvalidState(String),
}

impl PipelineError {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PipelineError::Model(_) => "MODEL_ERROR",
            PipelineError::SchemaValidationFailed(_) => "SCHEMA_VALIDATION_FAILED",
            PipelineError::CheckpointCorrupt { .. } => "CHECKPOINT_CORRUPT",
            PipelineError::Storage(_) => "STORAGE_ERROR",
            PipelineError::ThreadNotFound(_) => "THREAD_NOT_FOUND",
            PipelineError::RunFinished(_) => "RUN_FINISHED",
            PipelineError::InputNotExpected { .. } => "INPUT_NOT_EXPECTED",
            PipelineError::EmptyInput => "EMPTY_INPUT",
            PipelineError::InvalidState(_) => "INVALID_STATE",
        }
    }

    /// Returns true if calling again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::ModelUnavailable(_) | PipelineError::Storage(_))
    }
}

impl From<AIError> for PipelineError {
    fn from(err: AIError) -> Self {
        if err.is_retryable() {
            PipelineError::ModelUnavailable(err)
        } else {
            PipelineError::Model(err)
        }
    }
}

impl From<CheckpointError> for PipelineError {
    fn from(err: CheckpointError) -> Self {
        match err {
            CheckpointError::NotFound(thread_id) => PipelineError::ThreadNotFound(thread_id),
            CheckpointError::Corrupt { thread_id, reason } => {
                PipelineError::CheckpointCorrupt { thread_id, reason }
            }
            other => PipelineError::Storage(other.to_string()),
        }
    }
}
