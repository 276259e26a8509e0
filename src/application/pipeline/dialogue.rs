//! Dialogue turn - asks the model for the next interview utterance.

use std::sync::Arc;

use crate::domain::compliance::{
    prompts, route_after_dialogue, NodeName, Route, RunState, TranscriptMessage,
};
use crate::ports::{AIProvider, CompletionRequest, RequestMetadata};

use super::errors::PipelineError;
use super::messages::to_provider_messages;

/// Handler for one dialogue turn
pub struct DialogueTurnHandler {
    ai_provider: Arc<dyn AIProvider>,
}

impl DialogueTurnHandler {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    /// Appends exactly one assistant message and routes on it.
    ///
    /// The routing decision is also stored on the state as
    /// `information_complete`.
    pub async fn handle(&self, state: &mut RunState) -> Result<Route, PipelineError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            state.thread_id.clone(),
            NodeName::Dialogue,
        ))
        .with_system_prompt(prompts::dialogue_system_prompt())
        .with_messages(to_provider_messages(state.transcript.shared()));

        let response = self.ai_provider.complete(request).await?;

        let route = route_after_dialogue(&response.content);
        state.append(TranscriptMessage::assistant(response.content).from_node(NodeName::Dialogue));
        state.information_complete = route.information_complete();

        tracing::debug!(
            thread_id = %state.thread_id,
            route = %route,
            "Dialogue turn completed"
        );
        Ok(route)
    }
}
