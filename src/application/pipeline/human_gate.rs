//! Human-input gate - the only point where a run waits for the user.

use crate::domain::compliance::{prompts, NodeName, RunState, TranscriptMessage};

use super::errors::PipelineError;

/// Suspends the run and, on resume, feeds the user's reply back to the dialogue
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanInputGate;

impl HumanInputGate {
    pub fn new() -> Self {
        Self
    }

    /// Value surfaced to the presentation layer while suspended.
    pub fn prompt(&self) -> &'static str {
        prompts::HUMAN_INPUT_PROMPT
    }

    /// Appends exactly one user message and routes to the dialogue turn.
    pub fn resume(&self, state: &mut RunState, input: &str) -> Result<NodeName, PipelineError> {
        if state.current_node != NodeName::AskHuman {
            return Err(PipelineError::InputNotExpected {
                thread_id: state.thread_id.clone(),
                node: state.current_node,
            });
        }
        if input.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        state.append(TranscriptMessage::user(input).from_node(NodeName::AskHuman));
        Ok(NodeName::Dialogue)
    }
}
