//! Tool call value object - a model's request to invoke a tool.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request from the model to invoke a tool.
///
/// Arguments are kept as JSON because every tool has its own schema. The
/// `id` links the call to the tool message that answers it.
///
/// # Examples
///
/// ```ignore
/// use compliance_adviser::domain::tools::ToolCall;
///
/// let call = ToolCall::new(
///     "call_1",
///     "gdpr_retriever",
///     serde_json::json!({ "query": "lawful basis for processing purchase history" }),
/// );
/// assert_eq!(call.string_argument("query"), Some("lawful basis for processing purchase history"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call identifier
    id: String,

    /// Name of the tool to invoke
    name: String,

    /// Arguments for the tool (JSON object)
    arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Creates a tool call with a generated identifier.
    ///
    /// Some local models omit call ids; one is minted so tool results can
    /// still be correlated.
    pub fn with_generated_id(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self::new(format!("call_{}", Uuid::new_v4().simple()), name, arguments)
    }

    /// Returns the call identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments.
    pub fn arguments(&self) -> &serde_json::Value {
        &self.arguments
    }

    /// Consumes self and returns the arguments.
    pub fn into_arguments(self) -> serde_json::Value {
        self.arguments
    }

    /// Returns a string argument by key, if present.
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}
