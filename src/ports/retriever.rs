//! Retriever Port - similarity search over a regulation's text.
//!
//! Each analyser owns one retriever (GDPR or AI Act). Results come back
//! ordered by relevance and carry their source so the tool message can
//! attribute every snippet.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::embedder::EmbeddingError;

/// One retrieved passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSnippet {
    pub text: String,
    /// Document the passage came from, e.g. `gdpr.txt`.
    pub source: String,
    /// Position of the chunk within its document.
    pub chunk_index: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}

impl RetrievedSnippet {
    /// Renders the snippet with its attribution line.
    pub fn render(&self) -> String {
        format!("[source: {}, chunk {}]\n{}", self.source, self.chunk_index, self.text)
    }
}

/// Renders snippets for a tool message, separated by blank lines.
pub fn render_snippets(snippets: &[RetrievedSnippet]) -> String {
    snippets
        .iter()
        .map(RetrievedSnippet::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Errors from retrieval backends
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Query must not be empty")]
    EmptyQuery,
}

/// Port for similarity retrieval
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the passages most similar to `query`, best first.
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedSnippet>, RetrievalError>;

    /// Name of the index this retriever searches.
    fn index_name(&self) -> &str;
}
