//! Domain analysers - retrieval-augmented GDPR and AI Act analysis.
//!
//! Each analyser alternates between a model turn and a retrieval turn until
//! the model answers without requesting the retriever. Both turns write to
//! the analyser's own branch of the transcript.

use std::sync::Arc;

use crate::domain::compliance::{
    AnalysisResult, ComplianceDomain, RunState, TranscriptMessage,
};
use crate::domain::tools::ToolCall;
use crate::ports::{render_snippets, AIProvider, CompletionRequest, RequestMetadata, Retriever};

use super::errors::PipelineError;
use super::messages::to_provider_messages;

/// Tool result used when the index holds nothing relevant.
const NO_PASSAGES: &str = "No related passages were found.";

/// Outcome of one analyser turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerStep {
    /// The model requested the retriever; the retrieval node runs next.
    Retrieve,
    /// The analysis was recorded.
    Done,
}

/// Analyser for one regulatory domain
pub struct DomainAnalyzer {
    domain: ComplianceDomain,
    ai_provider: Arc<dyn AIProvider>,
    retriever: Arc<dyn Retriever>,
    max_rounds: u32,
}

impl DomainAnalyzer {
    pub fn new(
        domain: ComplianceDomain,
        ai_provider: Arc<dyn AIProvider>,
        retriever: Arc<dyn Retriever>,
        max_rounds: u32,
    ) -> Self {
        Self {
            domain,
            ai_provider,
            retriever,
            max_rounds,
        }
    }

    pub fn domain(&self) -> ComplianceDomain {
        self.domain
    }

    /// Runs one analyser turn.
    ///
    /// The retriever tool is bound until the branch has used its retrieval
    /// rounds; after that the model must answer from what it already has.
    pub async fn analyse(&self, state: &mut RunState) -> Result<AnalyzerStep, PipelineError> {
        let node = self.domain.analyser_node();
        let rounds = state.rounds_for(self.domain);
        let tools_allowed = rounds < self.max_rounds;

        if !tools_allowed {
            tracing::warn!(
                thread_id = %state.thread_id,
                domain = %self.domain,
                rounds,
                "Retrieval round limit reached, requesting final analysis"
            );
        }

        let mut request = CompletionRequest::new(RequestMetadata::new(state.thread_id.clone(), node))
            .with_system_prompt(self.domain.system_prompt())
            .with_messages(to_provider_messages(state.transcript.branch_view(self.domain)));
        if tools_allowed {
            request = request.with_tool(self.domain.retriever_tool());
        }

        let response = self.ai_provider.complete(request).await?;

        if tools_allowed && response.has_tool_calls() {
            tracing::debug!(
                thread_id = %state.thread_id,
                domain = %self.domain,
                calls = response.tool_calls.len(),
                "Analyser requested retrieval"
            );
            state.append(
                TranscriptMessage::assistant(response.content)
                    .with_tool_calls(response.tool_calls)
                    .in_branch(self.domain)
                    .from_node(node),
            );
            return Ok(AnalyzerStep::Retrieve);
        }

        state.append(
            TranscriptMessage::assistant(response.content.clone())
                .in_branch(self.domain)
                .from_node(node),
        );
        state.record_analysis(AnalysisResult::new(self.domain, response.content, rounds));

        tracing::info!(
            thread_id = %state.thread_id,
            domain = %self.domain,
            retrieval_rounds = rounds,
            "Analysis recorded"
        );
        Ok(AnalyzerStep::Done)
    }

    /// Answers every tool call of the branch's latest analyser message.
    ///
    /// Retrieval failures do not abort the run: the failure is reported to
    /// the model as the tool result so it can still produce an analysis.
    pub async fn retrieve(&self, state: &mut RunState) -> Result<(), PipelineError> {
        let calls: Vec<ToolCall> = state
            .transcript
            .last_in_branch(self.domain)
            .filter(|m| m.requests_tools())
            .map(|m| m.tool_calls.clone())
            .ok_or_else(|| {
                PipelineError::InvalidState(format!(
                    "no pending retrieval request in the {} branch",
                    self.domain
                ))
            })?;

        let round = state.count_retrieval_round(self.domain);
        let node = self.domain.retriever_node();

        for call in &calls {
            let content = self.answer(&state.thread_id.to_string(), call).await;
            state.append(
                TranscriptMessage::tool(call.id(), content)
                    .in_branch(self.domain)
                    .from_node(node),
            );
        }

        tracing::debug!(
            thread_id = %state.thread_id,
            domain = %self.domain,
            round,
            calls = calls.len(),
            "Retrieval round completed"
        );
        Ok(())
    }

    async fn answer(&self, thread_id: &str, call: &ToolCall) -> String {
        if call.name() != self.domain.retriever_tool_name() {
            tracing::warn!(thread_id, tool = call.name(), "Analyser called an unknown tool");
            return format!(
                "Unknown tool '{}'. The only available tool is '{}'.",
                call.name(),
                self.domain.retriever_tool_name()
            );
        }

        let query = call
            .string_argument("query")
            .map(str::to_string)
            .unwrap_or_else(|| call.arguments().to_string());

        match self.retriever.retrieve(&query).await {
            Ok(snippets) if snippets.is_empty() => NO_PASSAGES.to_string(),
            Ok(snippets) => render_snippets(&snippets),
            Err(err) => {
                tracing::warn!(
                    thread_id,
                    index = self.retriever.index_name(),
                    error = %err,
                    "Retrieval failed"
                );
                format!("Retrieval failed: {}", err)
            }
        }
    }
}
