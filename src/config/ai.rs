//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::ai::OpenAICompatibleConfig;

use super::error::{validate_http_url, ValidationError};

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider backs the pipeline
    #[serde(default)]
    pub provider: AiProvider,

    /// Chat-completions base URL (Ollama's OpenAI-compatible endpoint by default)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; local servers need none
    pub api_key: Option<Secret<String>>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiProvider {
    #[default]
    OpenaiCompatible,
    /// Scripted provider that echoes the user; for demos without a model server
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Builds the HTTP provider configuration.
    pub fn provider_config(&self) -> OpenAICompatibleConfig {
        let mut config = OpenAICompatibleConfig::new()
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_temperature(self.temperature)
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries);
        if let Some(key) = self.api_key.as_ref().filter(|_| self.has_api_key()) {
            config = config.with_api_key(key.expose_secret().clone());
        }
        config
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProvider::Mock {
            return Ok(());
        }
        validate_http_url("ai.base_url", &self.base_url)?;
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ai.model"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}
