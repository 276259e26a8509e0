//! Storage Adapters
//!
//! Implementations of the CheckpointStore port.
//!
//! ## Available Adapters
//!
//! - **FileCheckpointStore** - Stores run state as YAML files on disk (durable across restarts)
//! - **InMemoryCheckpointStore** - Stores run state in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileCheckpointStore, InMemoryCheckpointStore};
//!
//! let store = FileCheckpointStore::new("./data/checkpoints");
//! let store = InMemoryCheckpointStore::new();
//! ```

mod file_checkpoint_store;
mod in_memory_checkpoint_store;

pub use file_checkpoint_store::FileCheckpointStore;
pub use in_memory_checkpoint_store::InMemoryCheckpointStore;
