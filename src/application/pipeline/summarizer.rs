//! Summarizer - merges the two domain analyses into the final answer.

use std::sync::Arc;

use crate::domain::compliance::{prompts, NodeName, RunState, TranscriptMessage};
use crate::ports::{AIProvider, CompletionRequest, MessageRole, RequestMetadata};

use super::errors::PipelineError;

/// Handler for the summary node
pub struct Summarizer {
    ai_provider: Arc<dyn AIProvider>,
}

impl Summarizer {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Produces the summary once both analyses are recorded.
    ///
    /// The GDPR analysis is always presented first so the result does not
    /// depend on which branch finished last.
    pub async fn handle(&self, state: &mut RunState) -> Result<String, PipelineError> {
        let input = state.analyses.summary_input().ok_or_else(|| {
            PipelineError::InvalidState(format!(
                "summary requires both analyses, {} recorded",
                state.analyses.len()
            ))
        })?;

        let request = CompletionRequest::new(RequestMetadata::new(
            state.thread_id.clone(),
            NodeName::Summary,
        ))
        .with_system_prompt(prompts::SUMMARIZER_PROMPT)
        .with_message(MessageRole::User, input);

        let response = self.ai_provider.complete(request).await?;

        state.append(
            TranscriptMessage::assistant(response.content.clone()).from_node(NodeName::Summary),
        );
        state.record_summary(response.content.clone());

        tracing::info!(thread_id = %state.thread_id, "Summary produced");
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::domain::compliance::{AnalysisResult, ComplianceDomain};
    use crate::domain::foundation::ThreadId;

    fn state_with(domains: &[ComplianceDomain]) -> RunState {
        let mut state = RunState::new(ThreadId::new("t-1").unwrap());
        // Record out of order to show the summary input is ordered by domain.
        for domain in domains.iter().rev() {
            let text = format!("{} analysis", domain.display_name());
            state.record_analysis(AnalysisResult::new(*domain, text, 0));
        }
        state
    }

    #[tokio::test]
    async fn summarises_both_analyses_gdpr_first() {
        let provider = Arc::new(MockAIProvider::new().with_response("Overall: comply."));
        let summarizer = Summarizer::new(provider.clone());
        let mut state = state_with(&ComplianceDomain::ALL);

        let summary = summarizer.handle(&mut state).await.unwrap();

        assert_eq!(summary, "Overall: comply.");
        assert_eq!(state.summary.as_deref(), Some("Overall: comply."));
        assert_eq!(state.transcript.last().unwrap().node, Some(NodeName::Summary));

        let call = &provider.get_calls()[0];
        assert_eq!(
            call.last_user_content(),
            Some(prompts::summary_input("GDPR analysis", "AI Act analysis").as_str())
        );
        assert_eq!(call.system_prompt.as_deref(), Some(prompts::SUMMARIZER_PROMPT));
    }

    #[tokio::test]
    async fn refuses_with_one_analysis() {
        let provider = Arc::new(MockAIProvider::new());
        let summarizer = Summarizer::new(provider.clone());
        let mut state = state_with(&[ComplianceDomain::Gdpr]);

        let err = summarizer.handle(&mut state).await.unwrap_err();

        assert!(matches!(err, PipelineError::InvalidState(_)));
        assert_eq!(provider.call_count(), 0);
        assert!(state.summary.is_none());
    }
}
