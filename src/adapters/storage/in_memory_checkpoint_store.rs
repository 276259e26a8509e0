//! In-Memory Checkpoint Store Adapter
//!
//! Keeps run state in memory. Useful for testing and for the HTTP server when
//! durability is not needed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::compliance::RunState;
use crate::domain::foundation::ThreadId;
use crate::ports::{CheckpointError, CheckpointStore};

/// In-memory storage for run checkpoints
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    states: Arc<RwLock<HashMap<ThreadId, RunState>>>,
}

impl InMemoryCheckpointStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }

    /// Get the number of stored checkpoints
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, state: &RunState) -> Result<(), CheckpointError> {
        self.states
            .write()
            .await
            .insert(state.thread_id.clone(), state.clone());
        Ok(())
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<RunState, CheckpointError> {
        self.states
            .read()
            .await
            .get(thread_id)
            .cloned()
            .ok_or_else(|| CheckpointError::NotFound(thread_id.clone()))
    }

    async fn exists(&self, thread_id: &ThreadId) -> Result<bool, CheckpointError> {
        Ok(self.states.read().await.contains_key(thread_id))
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError> {
        self.states.write().await.remove(thread_id);
        Ok(())
    }
}
