//! Embedder Port - turns text into vectors for similarity search.

use async_trait::async_trait;

/// A dense embedding vector.
pub type Embedding = Vec<f32>;

/// Errors from embedding backends
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding response malformed: {0}")]
    InvalidResponse(String),

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Service for generating text embeddings
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        batch.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    /// Batch embedding; output order matches input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Model identifier string, recorded alongside persisted indices.
    fn model_name(&self) -> &str;
}
