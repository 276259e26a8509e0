//! File-based Checkpoint Store Adapter
//!
//! Stores each thread's run state as a YAML file on disk, one directory per
//! thread id. Writes go to a temporary file that is renamed over the old
//! checkpoint, so a crash mid-write leaves the previous checkpoint intact.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::compliance::RunState;
use crate::domain::foundation::ThreadId;
use crate::ports::{CheckpointError, CheckpointStore};

/// File-based storage for run checkpoints
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    base_path: PathBuf,
}

impl FileCheckpointStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileCheckpointStore::new("./data/checkpoints");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the directory path for a specific thread
    fn thread_dir(&self, thread_id: &ThreadId) -> PathBuf {
        self.base_path.join(thread_id.as_str())
    }

    /// Get the state file path for a thread
    fn state_file_path(&self, thread_id: &ThreadId) -> PathBuf {
        self.thread_dir(thread_id).join("state.yaml")
    }

    /// Ensure directory exists
    async fn ensure_dir(&self, path: &Path) -> Result<(), CheckpointError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, state: &RunState) -> Result<(), CheckpointError> {
        let dir = self.thread_dir(&state.thread_id);
        self.ensure_dir(&dir).await?;

        let yaml = serde_yaml::to_string(state)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))?;

        let file_path = self.state_file_path(&state.thread_id);
        let tmp_path = dir.join("state.yaml.tmp");

        fs::write(&tmp_path, yaml)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<RunState, CheckpointError> {
        let file_path = self.state_file_path(thread_id);

        if !fs::try_exists(&file_path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?
        {
            return Err(CheckpointError::NotFound(thread_id.clone()));
        }

        let yaml = fs::read_to_string(&file_path)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?;

        let state: RunState = serde_yaml::from_str(&yaml)
            .map_err(|e| CheckpointError::corrupt(thread_id, e.to_string()))?;

        if &state.thread_id != thread_id {
            return Err(CheckpointError::corrupt(
                thread_id,
                format!("file belongs to thread {}", state.thread_id),
            ));
        }

        Ok(state)
    }

    async fn exists(&self, thread_id: &ThreadId) -> Result<bool, CheckpointError> {
        fs::try_exists(self.state_file_path(thread_id))
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), CheckpointError> {
        let dir = self.thread_dir(thread_id);

        if fs::try_exists(&dir)
            .await
            .map_err(|e| CheckpointError::IoError(e.to_string()))?
        {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| CheckpointError::IoError(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compliance::{NodeName, TranscriptMessage};
    use tempfile::TempDir;

    fn thread(id: &str) -> ThreadId {
        ThreadId::new(id).unwrap()
    }

    fn test_state(id: &str) -> RunState {
        let mut state = RunState::new(thread(id));
        state.append(TranscriptMessage::user("We are Acme Corp"));
        state
    }

    #[tokio::test]
    async fn save_and_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let state = test_state("t-1");

        store.save(&state).await.unwrap();
        let loaded = store.load(&state.thread_id).await.unwrap();

        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn load_nonexistent_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());

        let result = store.load(&thread("missing")).await;

        assert!(matches!(result, Err(CheckpointError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_overwrites_previous_checkpoint() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let mut state = test_state("t-1");

        store.save(&state).await.unwrap();
        state.append(TranscriptMessage::assistant("Which country?"));
        state.transition_to(NodeName::AskHuman);
        store.save(&state).await.unwrap();

        let loaded = store.load(&state.thread_id).await.unwrap();
        assert_eq!(loaded.current_node, NodeName::AskHuman);
        assert_eq!(loaded.transcript.len(), 2);
        assert!(!store.thread_dir(&state.thread_id).join("state.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn garbage_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let id = thread("t-bad");

        std::fs::create_dir_all(store.thread_dir(&id)).unwrap();
        std::fs::write(store.state_file_path(&id), "current_node: [not, a, node").unwrap();

        let result = store.load(&id).await;
        assert!(matches!(result, Err(CheckpointError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn file_for_another_thread_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let state = test_state("t-a");
        store.save(&state).await.unwrap();

        let other = thread("t-b");
        std::fs::create_dir_all(store.thread_dir(&other)).unwrap();
        std::fs::copy(
            store.state_file_path(&state.thread_id),
            store.state_file_path(&other),
        )
        .unwrap();

        assert!(matches!(
            store.load(&other).await,
            Err(CheckpointError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn exists_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());
        let state = test_state("t-1");

        assert!(!store.exists(&state.thread_id).await.unwrap());
        store.save(&state).await.unwrap();
        assert!(store.exists(&state.thread_id).await.unwrap());

        store.delete(&state.thread_id).await.unwrap();
        assert!(!store.exists(&state.thread_id).await.unwrap());

        // Deleting again is a no-op.
        store.delete(&state.thread_id).await.unwrap();
    }

    #[tokio::test]
    async fn threads_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(temp_dir.path());

        store.save(&test_state("t-1")).await.unwrap();
        store.save(&test_state("t-2")).await.unwrap();
        store.delete(&thread("t-1")).await.unwrap();

        assert!(store.load(&thread("t-2")).await.is_ok());
    }

    #[tokio::test]
    async fn survives_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state("t-restart");
        FileCheckpointStore::new(temp_dir.path()).save(&state).await.unwrap();

        let reopened = FileCheckpointStore::new(temp_dir.path());
        assert_eq!(reopened.load(&state.thread_id).await.unwrap(), state);
    }
}
