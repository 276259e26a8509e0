//! Structured extractor - turns the user's confirming reply into a FactRecord.

use std::sync::Arc;

use crate::domain::compliance::{
    prompts, ExtractionError, FactRecord, NodeName, Role, RunState, TranscriptMessage,
    FACT_SCHEMA_TOOL,
};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

use super::errors::PipelineError;

/// Handler for the extraction node
pub struct StructuredExtractor {
    ai_provider: Arc<dyn AIProvider>,
}

impl StructuredExtractor {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Extracts the fact record from the latest user message.
    ///
    /// On success the record is stored on the state and its context message
    /// is appended for the analysers. Validation gaps are returned as
    /// `SchemaValidationFailed` with the state left untouched; there is no
    /// retry here.
    pub async fn handle(&self, state: &mut RunState) -> Result<FactRecord, PipelineError> {
        let input = state
            .transcript
            .last_with_role(Role::User)
            .map(|m| m.content.clone())
            .ok_or_else(|| PipelineError::InvalidState("no user message to extract from".into()))?;

        let request = CompletionRequest::new(RequestMetadata::new(
            state.thread_id.clone(),
            NodeName::Extractor,
        ))
        .with_system_prompt(prompts::EXTRACTOR_PROMPT)
        .with_message(MessageRole::User, input)
        .with_tool(FactRecord::schema_tool());

        let response = self.ai_provider.complete(request).await?;

        let call = response
            .tool_calls
            .iter()
            .find(|c| c.name() == FACT_SCHEMA_TOOL)
            .or_else(|| response.tool_calls.first())
            .ok_or_else(|| ExtractionError::NoStructuredCall(preview(&response.content)))?;

        let facts = FactRecord::from_arguments(call.arguments())?;

        state.append(
            TranscriptMessage::assistant(facts.context_message()).from_node(NodeName::Extractor),
        );
        state.record_facts(facts.clone());

        tracing::info!(
            thread_id = %state.thread_id,
            country = %facts.country,
            industry = %facts.industry,
            company_size = facts.company_size,
            "Company facts extracted"
        );
        Ok(facts)
    }
}

fn preview(content: &str) -> String {
    const LIMIT: usize = 80;
    let mut text: String = content.chars().take(LIMIT).collect();
    if content.chars().count() > LIMIT {
        text.push_str("...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::foundation::ThreadId;
    use serde_json::json;

    const ACME: &str =
        "Acme Corp, a 50-person French retail company processing customer purchase history";

    fn state() -> RunState {
        let mut state = RunState::new(ThreadId::new("t-1").unwrap());
        state.append(TranscriptMessage::user("Hello"));
        state.append(TranscriptMessage::assistant("Tell me about your company"));
        state.append(TranscriptMessage::user(ACME));
        state.append(TranscriptMessage::assistant("All information have been extracted!"));
        state
    }

    fn acme_arguments() -> serde_json::Value {
        json!({
            "company_name": "Acme Corp",
            "country": "France",
            "industry": "retail",
            "company_size": 50,
            "data_types_collected": ["customer purchase history"]
        })
    }

    #[tokio::test]
    async fn extracts_facts_from_latest_user_message() {
        let provider = Arc::new(MockAIProvider::new().with_tool_call_for(
            NodeName::Extractor,
            FACT_SCHEMA_TOOL,
            acme_arguments(),
        ));
        let extractor = StructuredExtractor::new(provider.clone());
        let mut state = state();

        let facts = extractor.handle(&mut state).await.unwrap();

        assert_eq!(facts.country, "France");
        assert_eq!(facts.company_size, 50);
        assert!(!facts.data_types_collected.clone().unwrap().is_empty());
        assert_eq!(state.facts, Some(facts));

        let call = &provider.get_calls()[0];
        assert_eq!(call.last_user_content(), Some(ACME));
        assert_eq!(call.messages.len(), 1);
        assert_eq!(call.tools[0].name(), FACT_SCHEMA_TOOL);
    }

    #[tokio::test]
    async fn appends_context_message_for_analysers() {
        let provider = Arc::new(MockAIProvider::new().with_tool_call(FACT_SCHEMA_TOOL, acme_arguments()));
        let extractor = StructuredExtractor::new(provider);
        let mut state = state();

        extractor.handle(&mut state).await.unwrap();

        let last = state.transcript.last().unwrap();
        assert_eq!(last.node, Some(NodeName::Extractor));
        assert!(last.content.contains("France"));
        assert!(last.branch.is_none());
    }

    #[tokio::test]
    async fn text_answer_is_a_schema_failure() {
        let provider = Arc::new(MockAIProvider::new().with_response("The company is French."));
        let extractor = StructuredExtractor::new(provider);
        let mut state = state();

        let err = extractor.handle(&mut state).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SchemaValidationFailed(ExtractionError::NoStructuredCall(_))
        ));
        assert_eq!(state.transcript.len(), 4);
        assert!(state.facts.is_none());
    }

    #[tokio::test]
    async fn missing_required_field_is_a_schema_failure() {
        let provider = Arc::new(MockAIProvider::new().with_tool_call(
            FACT_SCHEMA_TOOL,
            json!({"company_name": "Acme Corp", "country": "France"}),
        ));
        let extractor = StructuredExtractor::new(provider);

        let err = extractor.handle(&mut state()).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SchemaValidationFailed(ExtractionError::MissingField("industry"))
        ));
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(200);
        assert_eq!(preview(&long).chars().count(), 83);
        assert_eq!(preview("short"), "short");
    }
}
