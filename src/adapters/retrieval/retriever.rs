//! Retriever port backed by an in-memory vector store.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{Embedder, RetrievalError, RetrievedSnippet, Retriever};

use super::vector_store::VectorStore;

/// Number of passages returned per query unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

pub struct VectorStoreRetriever {
    store: Arc<VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorStoreRetriever {
    pub fn new(store: VectorStore, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: Arc::new(store),
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

#[async_trait]
impl Retriever for VectorStoreRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedSnippet>, RetrievalError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        if self.store.is_empty() {
            return Err(RetrievalError::IndexUnavailable(format!(
                "index '{}' has no chunks",
                self.store.name()
            )));
        }

        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, self.top_k);

        tracing::debug!(
            index = self.store.name(),
            query,
            results = results.len(),
            "Retrieved passages"
        );
        Ok(results)
    }

    fn index_name(&self) -> &str {
        self.store.name()
    }
}
