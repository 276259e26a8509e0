//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Scripted provider for tests and offline runs
//! - `OpenAICompatibleProvider` - Chat-completions API (Ollama, OpenAI)

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
