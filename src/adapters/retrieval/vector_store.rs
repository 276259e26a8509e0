//! Flat vector store with cosine-similarity search and JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{Embedding, RetrievedSnippet};

/// File name of a persisted index inside its directory.
pub const INDEX_FILE: &str = "index.json";

/// Errors from loading, building or saving an index
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Source document not found: {0}")]
    MissingSource(PathBuf),

    #[error("Index file is corrupt: {0}")]
    Corrupt(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] crate::ports::EmbeddingError),

    #[error("IO error: {0}")]
    Io(String),
}

/// One stored chunk and its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub embedding: Embedding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStore {
    name: String,
    /// Embedding model the vectors were produced with.
    model: String,
    chunks: Vec<IndexedChunk>,
}

impl VectorStore {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            chunks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn insert(&mut self, chunk: IndexedChunk) {
        self.chunks.push(chunk);
    }

    /// Returns the `k` chunks most similar to `query`, best first.
    ///
    /// Ties keep insertion order, so results are stable for a given index.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedSnippet> {
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (i, cosine_similarity(query, &c.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| {
                let chunk = &self.chunks[i];
                RetrievedSnippet {
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    chunk_index: chunk.chunk_index,
                    score,
                }
            })
            .collect()
    }

    /// Directory an index called `name` lives in under `root`.
    pub fn index_dir(root: &Path, name: &str) -> PathBuf {
        root.join(format!("{}_index", name))
    }

    /// Save index to `{root}/{name}_index/index.json`.
    pub async fn save(&self, root: &Path) -> Result<(), IndexError> {
        let dir = Self::index_dir(root, &self.name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| IndexError::Io(e.to_string()))?;

        let json = serde_json::to_vec(self).map_err(|e| IndexError::Io(e.to_string()))?;
        fs::write(dir.join(INDEX_FILE), json)
            .await
            .map_err(|e| IndexError::Io(e.to_string()))
    }

    /// Load index `name` from under `root`; `Ok(None)` if it was never saved.
    pub async fn load(root: &Path, name: &str) -> Result<Option<Self>, IndexError> {
        let path = Self::index_dir(root, name).join(INDEX_FILE);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IndexError::Io(e.to_string())),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| IndexError::Corrupt(format!("{}: {}", path.display(), e)))
    }
}

/// Cosine similarity; zero vectors are similar to nothing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
