//! HTTP DTOs for thread endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{NodeOutput, RunOutcome};
use crate::domain::compliance::{
    AnalysisResult, ComplianceDomain, FactRecord, Role, RunState, RunStatus, TranscriptMessage,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to send user input to a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One produced message, keyed by the node that wrote it.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMessageResponse {
    pub node: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<ComplianceDomain>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<String>,
}

impl From<&TranscriptMessage> for NodeMessageResponse {
    fn from(message: &TranscriptMessage) -> Self {
        Self {
            node: message
                .node
                .map(|n| n.as_str().to_string())
                .unwrap_or_else(|| "user".to_string()),
            role: message.role,
            content: message.content.clone(),
            branch: message.branch,
            tool_calls: message.tool_calls.iter().map(|c| c.name().to_string()).collect(),
        }
    }
}

impl From<NodeOutput> for NodeMessageResponse {
    fn from(output: NodeOutput) -> Self {
        let mut response = Self::from(&output.message);
        response.node = output.node.as_str().to_string();
        response
    }
}

/// Result of advancing a thread.
///
/// `suspended` is true when the run waits for user input; `messages` is then
/// whatever the run produced before suspending, possibly nothing.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub thread_id: String,
    pub status: RunStatus,
    pub suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub messages: Vec<NodeMessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            thread_id: outcome.thread_id.to_string(),
            suspended: outcome.is_suspended(),
            status: outcome.status,
            prompt: outcome.prompt,
            messages: outcome.outputs.into_iter().map(Into::into).collect(),
            summary: outcome.summary,
        }
    }
}

/// Tagged analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub domain: ComplianceDomain,
    pub content: String,
    pub retrieval_rounds: u32,
    pub completed_at: String,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            domain: result.domain,
            content: result.content.clone(),
            retrieval_rounds: result.retrieval_rounds,
            completed_at: result.completed_at.to_rfc3339(),
        }
    }
}

/// Full view of a thread's latest checkpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub current_node: String,
    pub status: RunStatus,
    pub information_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<FactRecord>,
    pub analyses: Vec<AnalysisResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub checkpoint_seq: u64,
    pub transcript: Vec<NodeMessageResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RunState> for ThreadResponse {
    fn from(state: RunState) -> Self {
        let analyses = ComplianceDomain::ALL
            .iter()
            .filter_map(|d| state.analyses.get(*d))
            .map(Into::into)
            .collect();
        Self {
            thread_id: state.thread_id.to_string(),
            current_node: state.current_node.as_str().to_string(),
            status: state.status(),
            information_complete: state.information_complete,
            facts: state.facts.clone(),
            analyses,
            summary: state.summary.clone(),
            checkpoint_seq: state.checkpoint_seq,
            transcript: state.transcript.messages().iter().map(Into::into).collect(),
            created_at: state.created_at.to_rfc3339(),
            updated_at: state.updated_at.to_rfc3339(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
