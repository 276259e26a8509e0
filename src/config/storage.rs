//! Checkpoint storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Checkpoint storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory of the file backend
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
}

/// Checkpoint storage backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// YAML files, durable across restarts
    #[default]
    File,
    /// Process memory; lost on exit
    Memory,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::File && self.checkpoint_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.checkpoint_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}
