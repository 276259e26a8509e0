//! Pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound accepted for `max_retrieval_rounds`.
const MAX_RETRIEVAL_ROUNDS_LIMIT: u32 = 50;

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Retrieval round-trips an analyser may make before it must answer
    #[serde(default = "default_max_retrieval_rounds")]
    pub max_retrieval_rounds: u32,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_retrieval_rounds == 0 || self.max_retrieval_rounds > MAX_RETRIEVAL_ROUNDS_LIMIT {
            return Err(ValidationError::InvalidRetrievalRounds {
                max: MAX_RETRIEVAL_ROUNDS_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retrieval_rounds: default_max_retrieval_rounds(),
        }
    }
}

fn default_max_retrieval_rounds() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_limit() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_retrieval_rounds, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_limit_bounds() {
        let config = PipelineConfig {
            max_retrieval_rounds: 0,
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            max_retrieval_rounds: 51,
        };
        assert!(config.validate().is_err());
    }
}
