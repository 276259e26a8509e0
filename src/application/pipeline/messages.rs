//! Conversion from transcript entries to provider messages.

use crate::domain::compliance::{Role, TranscriptMessage};
use crate::ports::{Message, MessageRole};

/// Maps transcript entries to the provider's message format, preserving
/// tool calls and tool-call ids.
pub fn to_provider_messages<'a>(
    messages: impl IntoIterator<Item = &'a TranscriptMessage>,
) -> Vec<Message> {
    messages
        .into_iter()
        .map(|m| {
            let role = match m.role {
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
                Role::System => MessageRole::System,
                Role::Tool => MessageRole::Tool,
            };
            Message {
                role,
                content: m.content.clone(),
                tool_calls: m.tool_calls.clone(),
                tool_call_id: m.tool_call_id.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::ToolCall;
    use serde_json::json;

    #[test]
    fn preserves_roles_and_tool_links() {
        let call = ToolCall::new("call_1", "gdpr_retriever", json!({"query": "consent"}));
        let transcript = vec![
            TranscriptMessage::user("hi"),
            TranscriptMessage::assistant("").with_tool_calls(vec![call]),
            TranscriptMessage::tool("call_1", "Article 7"),
        ];

        let messages = to_provider_messages(&transcript);

        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].tool_calls.len(), 1);
        assert_eq!(messages[2].role, MessageRole::Tool);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));
    }
}
