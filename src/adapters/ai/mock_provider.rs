//! Mock AI Provider for testing.
//!
//! Provides a scripted implementation of the AIProvider port so the pipeline
//! can be driven end to end without a model server.
//!
//! # Features
//!
//! - Queued text and tool-call responses, globally or per pipeline node
//! - Echo mode (answers with the latest user message)
//! - Simulated delays and error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response_for(NodeName::Dialogue, "Which country are you in?")
//!     .with_tool_call_for(NodeName::Extractor, "company_facts", json!({...}));
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::compliance::NodeName;
use crate::domain::tools::ToolCall;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
///
/// Responses queued for a node take precedence over the global queue. When
/// both are empty the provider echoes the latest user message (echo mode)
/// or returns a fixed default.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Per-node responses (consumed in order).
    node_responses: Arc<Mutex<HashMap<NodeName, VecDeque<MockResponse>>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    echo: bool,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return plain text.
    Text(String),
    /// Ask for tool calls.
    ToolCalls(Vec<ToolCall>),
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate context too long.
    ContextTooLong,
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContextTooLong => AIError::context_too_long("mock context limit"),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            node_responses: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            echo: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, node: Option<NodeName>, response: MockResponse) -> Self {
        match node {
            Some(node) => lock(&self.node_responses)
                .entry(node)
                .or_default()
                .push_back(response),
            None => lock(&self.responses).push_back(response),
        }
        self
    }

    /// Adds a text response to the global queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(None, MockResponse::Text(content.into()))
    }

    /// Adds a text response for one node.
    pub fn with_response_for(self, node: NodeName, content: impl Into<String>) -> Self {
        self.push(Some(node), MockResponse::Text(content.into()))
    }

    /// Adds a single tool call to the global queue.
    pub fn with_tool_call(self, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        self.push(
            None,
            MockResponse::ToolCalls(vec![ToolCall::with_generated_id(name, arguments)]),
        )
    }

    /// Adds a single tool call for one node.
    pub fn with_tool_call_for(
        self,
        node: NodeName,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        self.push(
            Some(node),
            MockResponse::ToolCalls(vec![ToolCall::with_generated_id(name, arguments)]),
        )
    }

    /// Adds a response requesting several tool calls at once for one node.
    pub fn with_tool_calls_for(self, node: NodeName, calls: Vec<ToolCall>) -> Self {
        self.push(Some(node), MockResponse::ToolCalls(calls))
    }

    /// Adds an error response to the global queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(None, MockResponse::Error(error))
    }

    /// Adds an error response for one node.
    pub fn with_error_for(self, node: NodeName, error: MockError) -> Self {
        self.push(Some(node), MockResponse::Error(error))
    }

    /// Answers with the latest user message once the queues are empty.
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Returns the recorded calls issued by one node.
    pub fn calls_for(&self, node: NodeName) -> Vec<CompletionRequest> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.metadata.node == node)
            .cloned()
            .collect()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response for a request.
    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        if let Some(response) = lock(&self.node_responses)
            .get_mut(&request.metadata.node)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        if let Some(response) = lock(&self.responses).pop_front() {
            return response;
        }

        if self.echo {
            if let Some(content) = request.last_user_content() {
                return MockResponse::Text(content.to_string());
            }
        }

        MockResponse::Text("Mock response".to_string())
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.next_response(&request);
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match response {
            MockResponse::Text(content) => Ok(CompletionResponse {
                content,
                tool_calls: Vec::new(),
                usage: TokenUsage::new(10, 20),
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::ToolCalls(tool_calls) => Ok(CompletionResponse {
                content: String::new(),
                tool_calls,
                usage: TokenUsage::new(10, 5),
                model: self.info.model.clone(),
                finish_reason: FinishReason::ToolCalls,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
