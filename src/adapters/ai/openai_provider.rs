//! OpenAI-compatible Provider - AIProvider over the chat-completions HTTP API.
//!
//! Works against OpenAI itself and against servers that mimic its API, such
//! as Ollama's `/v1` endpoint, which is the default target.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAICompatibleConfig::new()
//!     .with_model("llama3.2:1b")
//!     .with_base_url("http://localhost:11434/v1");
//!
//! let provider = OpenAICompatibleProvider::new(config)?;
//! ```
//!
//! # Tool calls
//!
//! Tool definitions are sent in the `tools` array. Tool calls come back with
//! JSON-encoded argument strings, which are decoded into `ToolCall`s; tool
//! results go back as `role: "tool"` messages carrying `tool_call_id`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::tools::ToolCall;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, TokenUsage,
};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// API key; local servers usually need none.
    api_key: Option<Secret<String>>,
    /// Model to use (e.g., "llama3.2:1b", "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API (default: http://localhost:11434/v1).
    pub base_url: String,
    /// Sampling temperature applied when a request sets none.
    pub temperature: f32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAICompatibleConfig {
    /// Creates a configuration targeting a local Ollama server.
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: "llama3.2:1b".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret().as_str())
    }
}

/// Chat-completions provider implementation.
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to the wire format.
    fn to_wire_request(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(WireMessage::from_message(&Message::system(prompt.clone())));
        }
        messages.extend(request.messages.iter().map(WireMessage::from_message));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(|t| t.to_openai_format()).collect())
        };

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            tools,
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
            stream: false,
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(request));

        if let Some(key) = self.config.api_key() {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                AIError::unavailable(format!("Connection failed: {}", e))
            } else {
                AIError::network(e.to_string())
            }
        })
    }

    /// Maps non-success statuses to errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            404 => Err(AIError::InvalidRequest(format!(
                "Model or endpoint not found: {}",
                error_body
            ))),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 => {
                if error_body.contains("maximum context length")
                    || error_body.contains("context_length_exceeded")
                {
                    Err(AIError::context_too_long(error_body))
                } else {
                    Err(AIError::InvalidRequest(error_body))
                }
            }
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        let message = serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(String::from));

        if let Some(message) = message {
            if let Some(idx) = message.find("try again in ") {
                let digits: String = message[idx + 13..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
        30
    }

    /// Parses a successful response body.
    fn parse_body(body: ChatResponse) -> Result<CompletionResponse, AIError> {
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No choices in response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(WireToolCall::into_tool_call)
            .collect::<Vec<_>>();

        let finish_reason = match choice.finish_reason.as_deref() {
            _ if !tool_calls.is_empty() => FinishReason::ToolCalls,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage,
            model: body.model,
            finish_reason,
        })
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(request).await?;
        let response = Self::handle_response_status(response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;
        Self::parse_body(body)
    }
}

#[async_trait]
impl AIProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(&request).await {
                Ok(completion) => return Ok(completion),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    tracing::warn!(
                        thread_id = %request.metadata.thread_id,
                        node = %request.metadata.node,
                        attempt = retry_count + 1,
                        error = %err,
                        "Model request failed, retrying"
                    );
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count.min(6))).await;
            retry_count += 1;
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai_compatible", &self.config.model).with_functions(true)
    }
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn from_message(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        };
        let tool_calls = if message.tool_calls.is_empty() {
            None
        } else {
            Some(message.tool_calls.iter().map(WireToolCall::from_tool_call).collect())
        };

        Self {
            role: role.to_string(),
            content: Some(message.content.clone()),
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded on the wire; some servers send an object instead.
    arguments: serde_json::Value,
}

impl WireToolCall {
    fn from_tool_call(call: &ToolCall) -> Self {
        Self {
            id: Some(call.id().to_string()),
            kind: function_type(),
            function: WireFunction {
                name: call.name().to_string(),
                arguments: serde_json::Value::String(call.arguments().to_string()),
            },
        }
    }

    fn into_tool_call(self) -> ToolCall {
        let arguments = match self.function.arguments {
            serde_json::Value::String(raw) => {
                serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
            }
            other => other,
        };

        match self.id.filter(|id| !id.is_empty()) {
            Some(id) => ToolCall::new(id, self.function.name, arguments),
            None => ToolCall::with_generated_id(self.function.name, arguments),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
