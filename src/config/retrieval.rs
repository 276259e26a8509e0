//! Retrieval configuration - document sources, index location and embeddings

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::retrieval::fastembed_model;

use super::error::{validate_http_url, ValidationError};

/// Retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Directory holding `gdpr.txt` and `act.txt`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the persisted `{name}_index` directories
    #[serde(default = "default_index_root")]
    pub index_root: PathBuf,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Embedding model name, shared by the FastEmbed and Ollama backends
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Ollama server URL (without the `/v1` suffix)
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Vector size of the hashing embedder
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Where FastEmbed keeps downloaded models
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

/// Embedding backend type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local ONNX model, downloaded once
    #[default]
    FastEmbed,
    Ollama,
    /// Offline feature hashing, no server needed
    Hashing,
}

impl RetrievalConfig {
    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ValidationError::InvalidChunking);
        }
        if self.top_k == 0 {
            return Err(ValidationError::InvalidTopK);
        }
        self.embedding.validate()
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.provider {
            EmbeddingProvider::FastEmbed => {
                if fastembed_model(&self.model).is_none() {
                    return Err(ValidationError::UnsupportedEmbeddingModel(self.model.clone()));
                }
            }
            EmbeddingProvider::Ollama => {
                validate_http_url("retrieval.embedding.base_url", &self.base_url)?;
                if self.model.trim().is_empty() {
                    return Err(ValidationError::MissingRequired("retrieval.embedding.model"));
                }
            }
            EmbeddingProvider::Hashing => {
                if self.dimension == 0 {
                    return Err(ValidationError::InvalidDimension);
                }
            }
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            index_root: default_index_root(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            dimension: default_dimension(),
            timeout_secs: default_embedding_timeout(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("regulations-text")
}

fn default_index_root() -> PathBuf {
    PathBuf::from("vector_dbs")
}

fn default_chunk_size() -> usize {
    100
}

fn default_chunk_overlap() -> usize {
    20
}

fn default_top_k() -> usize {
    4
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_embedding_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_embedding_timeout() -> u64 {
    60
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".fastembed_cache")
}
