//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and the outside world. Adapters implement these ports and
//! are injected into the coordinator as `Arc<dyn Port>` handles.
//!
//! - `AIProvider` - the language model behind every agent node
//! - `Retriever` - similarity search over one regulation
//! - `Embedder` - text to vector, used when building and querying indices
//! - `CheckpointStore` - durable run state keyed by thread id

mod ai_provider;
mod checkpoint_store;
mod embedder;
mod retriever;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use checkpoint_store::{CheckpointError, CheckpointStore};
pub use embedder::{Embedder, Embedding, EmbeddingError};
pub use retriever::{render_snippets, RetrievalError, RetrievedSnippet, Retriever};
