//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the pipeline to external systems:
//! - `ai` - language model providers (OpenAI-compatible HTTP, scripted mock)
//! - `storage` - checkpoint stores (YAML files, in-memory)
//! - `retrieval` - text splitting, embeddings and the persisted vector indices
//! - `http` - REST API over the run coordinator

pub mod ai;
pub mod http;
pub mod retrieval;
pub mod storage;

pub use ai::{MockAIProvider, OpenAICompatibleProvider};
pub use retrieval::{IndexLoader, VectorStoreRetriever};
pub use storage::{FileCheckpointStore, InMemoryCheckpointStore};
