//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COMPLIANCE_ADVISER` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working setup
//! against a local Ollama server and an in-process embedding model.
//!
//! # Example
//!
//! ```no_run
//! use compliance_adviser::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod pipeline;
mod retrieval;
mod server;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use pipeline::PipelineConfig;
pub use retrieval::{EmbeddingConfig, EmbeddingProvider, RetrievalConfig};
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "COMPLIANCE_ADVISER";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Document indices and embeddings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Checkpoint storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pipeline limits
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COMPLIANCE_ADVISER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COMPLIANCE_ADVISER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COMPLIANCE_ADVISER__AI__MODEL=llama3.2:1b` -> `ai.model = "llama3.2:1b"`
    /// - `COMPLIANCE_ADVISER__RETRIEVAL__EMBEDDING__PROVIDER=hashing`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.retrieval.validate()?;
        self.storage.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "COMPLIANCE_ADVISER__SERVER__PORT",
        "COMPLIANCE_ADVISER__AI__PROVIDER",
        "COMPLIANCE_ADVISER__AI__MODEL",
        "COMPLIANCE_ADVISER__RETRIEVAL__EMBEDDING__PROVIDER",
        "COMPLIANCE_ADVISER__PIPELINE__MAX_RETRIEVAL_ROUNDS",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ai.model, "llama3.2:1b");
        assert_eq!(config.pipeline.max_retrieval_rounds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("COMPLIANCE_ADVISER__SERVER__PORT", "3000");
        env::set_var("COMPLIANCE_ADVISER__AI__PROVIDER", "mock");
        env::set_var("COMPLIANCE_ADVISER__AI__MODEL", "mistral");
        env::set_var("COMPLIANCE_ADVISER__RETRIEVAL__EMBEDDING__PROVIDER", "hashing");
        env::set_var("COMPLIANCE_ADVISER__PIPELINE__MAX_RETRIEVAL_ROUNDS", "2");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert_eq!(config.ai.model, "mistral");
        assert_eq!(config.retrieval.embedding.provider, EmbeddingProvider::Hashing);
        assert_eq!(config.pipeline.max_retrieval_rounds, 2);
    }

    #[test]
    fn test_unparseable_value_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("COMPLIANCE_ADVISER__SERVER__PORT", "not-a-port");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validate_reports_first_invalid_section() {
        let mut config = AppConfig::default();
        config.pipeline.max_retrieval_rounds = 0;

        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRetrievalRounds { .. })
        ));
    }
}
