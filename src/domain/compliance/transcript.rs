//! Transcript - the append-only message log shared by every node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::MessageId;
use crate::domain::tools::ToolCall;

use super::domain::ComplianceDomain;
use super::node::NodeName;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// One entry in the transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Node that produced the message; `None` for the opening user message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeName>,
    /// Analyser branch the message belongs to; `None` for shared messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<ComplianceDomain>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            node: None,
            branch: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a tool result answering the call with `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::new(Role::Tool, content);
        message.tool_call_id = Some(tool_call_id.into());
        message
    }

    /// Attributes the message to a node.
    pub fn from_node(mut self, node: NodeName) -> Self {
        self.node = Some(node);
        self
    }

    /// Scopes the message to an analyser branch.
    pub fn in_branch(mut self, domain: ComplianceDomain) -> Self {
        self.branch = Some(domain);
        self
    }

    /// Attaches tool calls requested by the model.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// True if this message asks for at least one tool invocation.
    pub fn requests_tools(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

/// Ordered, append-only message log
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns a reference to it.
    pub fn push(&mut self, message: TranscriptMessage) -> &TranscriptMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// All messages in order.
    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message of any role.
    pub fn last(&self) -> Option<&TranscriptMessage> {
        self.messages.last()
    }

    /// Most recent message with the given role.
    pub fn last_with_role(&self, role: Role) -> Option<&TranscriptMessage> {
        self.messages.iter().rev().find(|m| m.role == role)
    }

    /// Messages outside any analyser branch.
    pub fn shared(&self) -> Vec<&TranscriptMessage> {
        self.messages.iter().filter(|m| m.branch.is_none()).collect()
    }

    /// What one analyser branch sees: shared messages plus its own.
    ///
    /// Messages produced by the other branch are excluded so the two
    /// analyses never read each other's tool traffic.
    pub fn branch_view(&self, domain: ComplianceDomain) -> Vec<&TranscriptMessage> {
        self.messages
            .iter()
            .filter(|m| m.branch.is_none() || m.branch == Some(domain))
            .collect()
    }

    /// Latest message of a branch, if the branch has produced any.
    pub fn last_in_branch(&self, domain: ComplianceDomain) -> Option<&TranscriptMessage> {
        self.messages.iter().rev().find(|m| m.branch == Some(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptMessage::user("Hello"));
        transcript.push(TranscriptMessage::assistant("Hi").from_node(NodeName::Dialogue));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[1].node, Some(NodeName::Dialogue));
        assert_eq!(transcript.last().unwrap().content, "Hi");
    }

    #[test]
    fn last_with_role_skips_other_roles() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptMessage::user("first"));
        transcript.push(TranscriptMessage::assistant("reply"));
        transcript.push(TranscriptMessage::user("second"));

        assert_eq!(transcript.last_with_role(Role::User).unwrap().content, "second");
        assert_eq!(transcript.last_with_role(Role::Assistant).unwrap().content, "reply");
        assert!(transcript.last_with_role(Role::Tool).is_none());
    }

    #[test]
    fn branch_view_hides_other_branch() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptMessage::user("facts"));
        transcript.push(
            TranscriptMessage::assistant("gdpr analysis").in_branch(ComplianceDomain::Gdpr),
        );
        transcript.push(
            TranscriptMessage::assistant("act analysis").in_branch(ComplianceDomain::AiAct),
        );

        let gdpr: Vec<&str> = transcript
            .branch_view(ComplianceDomain::Gdpr)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(gdpr, vec!["facts", "gdpr analysis"]);

        let act: Vec<&str> = transcript
            .branch_view(ComplianceDomain::AiAct)
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(act, vec!["facts", "act analysis"]);

        assert_eq!(transcript.shared().len(), 1);
    }

    #[test]
    fn tool_message_carries_call_id() {
        let msg = TranscriptMessage::tool("call_1", "snippets");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn requests_tools_only_for_assistant_with_calls() {
        let call = ToolCall::new("call_1", "gdpr_retriever", serde_json::json!({"query": "q"}));
        let asking = TranscriptMessage::assistant("").with_tool_calls(vec![call]);
        assert!(asking.requests_tools());
        assert!(!TranscriptMessage::assistant("plain").requests_tools());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn transcript_serializes_as_plain_list() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptMessage::user("Hello"));
        let value = serde_json::to_value(&transcript).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["content"], "Hello");
        assert!(value[0].get("tool_calls").is_none());
    }
}
