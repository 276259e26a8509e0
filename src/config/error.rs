//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Chunk overlap must be smaller than chunk size")]
    InvalidChunking,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    #[error("Unsupported FastEmbed model: {0}")]
    UnsupportedEmbeddingModel(String),

    #[error("Embedding dimension must be at least 1")]
    InvalidDimension,

    #[error("max_retrieval_rounds must be between 1 and {max}")]
    InvalidRetrievalRounds { max: u32 },
}

/// Checks that a URL uses the http or https scheme.
pub(crate) fn validate_http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        })
    }
}
