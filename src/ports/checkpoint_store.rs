//! Checkpoint Store Port - Interface for persisting run state between transitions.
//!
//! The coordinator saves the whole [`RunState`] after every node transition.
//! A thread suspended at the human-input gate, or interrupted by a crash, is
//! picked up again by loading its last checkpoint.

use async_trait::async_trait;

use crate::domain::compliance::RunState;
use crate::domain::foundation::ThreadId;

/// Errors that can occur during checkpoint operations
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("No checkpoint for thread: {0}")]
    NotFound(ThreadId),

    #[error("Checkpoint for thread {thread_id} is corrupt: {reason}")]
    Corrupt { thread_id: ThreadId, reason: String },

    #[error("Failed to serialize checkpoint: {0}")]
    SerializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl CheckpointError {
    pub fn corrupt(thread_id: &ThreadId, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            thread_id: thread_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Port for persisting and loading run state
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save the latest state of a thread, replacing the previous checkpoint
    ///
    /// # Errors
    /// Returns `CheckpointError` if save fails
    async fn save(&self, state: &RunState) -> Result<(), CheckpointError>;

    /// Load the latest checkpoint of a thread
    ///
    /// # Errors
    /// Returns `CheckpointError::NotFound` if the thread has never been saved,
    /// `CheckpointError::Corrupt` if the stored state cannot be read back
    async fn load(&self, thread_id: &ThreadId) -> Result<RunState, CheckpointError>;

    /// Check if a checkpoint exists for a thread
    async fn exists(&self, thread_id: &ThreadId) -> Result<bool, CheckpointError>;

    /// Delete the checkpoint of a thread; deleting an unknown thread is not an error
    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError>;
}
