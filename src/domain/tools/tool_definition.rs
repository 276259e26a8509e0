//! Tool definition - schema and metadata for a tool the model may call.

use serde::{Deserialize, Serialize};

/// Definition of a function the language model can call.
///
/// Used both for retrieval tools (the model asks for a search) and for
/// structured extraction (the schema is bound as the only callable function
/// and the call arguments are the extracted record).
///
/// # Examples
///
/// ```ignore
/// use compliance_adviser::domain::tools::ToolDefinition;
///
/// let definition = ToolDefinition::new(
///     "gdpr_retriever",
///     "Retrieves related articles from GDPR",
///     serde_json::json!({
///         "type": "object",
///         "required": ["query"],
///         "properties": {
///             "query": { "type": "string", "description": "query to look up in retriever" }
///         }
///     }),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "gdpr_retriever")
    name: String,

    /// Human-readable description shown to the model
    description: String,

    /// JSON Schema for the parameters
    parameters_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema.
    pub fn parameters_schema(&self) -> &serde_json::Value {
        &self.parameters_schema
    }

    /// Names of the parameters the schema marks as required.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// Converts to the OpenAI chat-completions tool format.
    ///
    /// Ollama's OpenAI-compatible endpoint accepts the same structure.
    pub fn to_openai_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": { "type": "string" }
            }
        })
    }

    #[test]
    fn new_creates_definition() {
        let def = ToolDefinition::new("gdpr_retriever", "Search GDPR", sample_params_schema());

        assert_eq!(def.name(), "gdpr_retriever");
        assert_eq!(def.description(), "Search GDPR");
        assert!(def.parameters_schema().is_object());
    }

    #[test]
    fn required_parameters_reads_schema() {
        let def = ToolDefinition::new("gdpr_retriever", "Search GDPR", sample_params_schema());
        assert_eq!(def.required_parameters(), vec!["query"]);
    }

    #[test]
    fn required_parameters_empty_without_required_key() {
        let def = ToolDefinition::new("noop", "Nothing", serde_json::json!({"type": "object"}));
        assert!(def.required_parameters().is_empty());
    }

    #[test]
    fn to_openai_format_has_correct_structure() {
        let def = ToolDefinition::new("gdpr_retriever", "Search GDPR", sample_params_schema());

        let openai = def.to_openai_format();

        assert_eq!(openai["type"], "function");
        assert_eq!(openai["function"]["name"], "gdpr_retriever");
        assert_eq!(openai["function"]["description"], "Search GDPR");
        assert_eq!(openai["function"]["parameters"]["required"][0], "query");
    }
}
