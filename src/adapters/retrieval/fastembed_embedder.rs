//! In-process embedder running a local ONNX sentence model via FastEmbed.
//!
//! The model is downloaded into `cache_dir` on first use and loaded once;
//! inference runs on the blocking pool.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Arc;

use crate::ports::{Embedder, Embedding, EmbeddingError};

/// Model used when none is configured.
pub const DEFAULT_FASTEMBED_MODEL: &str = "all-minilm-l6-v2";

/// Maps a configured model name onto a FastEmbed model.
///
/// Accepts the short Ollama-style name ("all-minilm") too, so one config
/// value works for both backends.
pub fn fastembed_model(name: &str) -> Option<EmbeddingModel> {
    match name.trim().to_ascii_lowercase().as_str() {
        "all-minilm" | "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Some(EmbeddingModel::AllMiniLML6V2)
        }
        "all-minilm-l12-v2" => Some(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        _ => None,
    }
}

pub struct FastEmbedEmbedder {
    model: Arc<TextEmbedding>,
    model_name: String,
}

impl FastEmbedEmbedder {
    /// Loads `model`, downloading it first if it is not cached.
    ///
    /// Blocks while downloading; call from a blocking context.
    pub fn try_new(model: &str, cache_dir: impl Into<PathBuf>) -> Result<Self, EmbeddingError> {
        let kind = fastembed_model(model).ok_or_else(|| {
            EmbeddingError::Unavailable(format!("Unsupported FastEmbed model '{}'", model))
        })?;

        let options = InitOptions::new(kind.clone())
            .with_cache_dir(cache_dir.into())
            .with_show_download_progress(false);
        let embedding = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::Unavailable(format!("Failed to initialize FastEmbed: {}", e)))?;

        Ok(Self {
            model: Arc::new(embedding),
            model_name: format!("fastembed/{:?}", kind),
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let batch = texts.to_vec();
        let expected = batch.len();
        let embeddings = tokio::task::spawn_blocking(move || model.embed(batch, None))
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("Embedding task failed: {}", e)))?
            .map_err(|e| EmbeddingError::Unavailable(format!("Batch embedding failed: {}", e)))?;

        if embeddings.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: embeddings.len(),
            });
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
