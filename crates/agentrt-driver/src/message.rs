//! Chat message / tool-call data model (§3).

use agentrt_governors::CompactableMessage;
use serde::{Deserialize, Serialize};

/// A chat message in OpenAI wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn assistant_with_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        }
    }

    /// §4.4 recursion step: `content` is the JSON-serialized result, or the
    /// literal string `"done"` if the result was nullish.
    pub fn tool_result(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    pub fn is_assistant_with_tool_calls(&self) -> bool {
        self.role == "assistant" && self.tool_calls.as_ref().is_some_and(|tc| !tc.is_empty())
    }
}

/// A tool-call stub on an assistant message, or its fully-assembled form
/// once streaming deltas have been merged (§3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// §3 ToolCallContext: the accumulating record threaded through one
/// top-level inference call's recursion.
#[derive(Debug, Clone, Default)]
pub struct ToolCallContext {
    /// Messages produced since the top-level call (assistant + tool
    /// messages from every recursive step so far).
    pub messages: Vec<ChatMessage>,
    pub depth: u32,
    pub completion: Option<agentrt_governors::CompletionSignal>,
    pub warning_injected: bool,
}

impl ToolCallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// One step of the inference loop, expressed as an explicit advance
    /// rather than a recursive call. Depth increases by exactly 1 per step.
    pub fn advance(&self, new_messages: Vec<ChatMessage>, completion: Option<agentrt_governors::CompletionSignal>) -> Self {
        let mut messages = self.messages.clone();
        messages.extend(new_messages);
        Self {
            messages,
            depth: self.depth + 1,
            completion,
            warning_injected: self.warning_injected,
        }
    }
}

impl CompactableMessage for ChatMessage {
    fn tool_call_id(&self) -> Option<&str> {
        if self.role == "tool" {
            self.tool_call_id.as_deref()
        } else {
            None
        }
    }

    fn tool_call_stub_ids(&self) -> Vec<(String, bool)> {
        self.tool_calls
            .as_ref()
            .map(|calls| {
                calls
                    .iter()
                    .map(|c| (c.id.clone(), !c.function.name.is_empty()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn has_empty_tool_call_list(&self) -> bool {
        matches!(&self.tool_calls, Some(calls) if calls.is_empty())
    }

    fn drop_empty_tool_call_stubs(&mut self) {
        if let Some(calls) = &mut self.tool_calls {
            calls.retain(|c| !c.function.name.is_empty());
        }
    }

    fn clear_tool_call_list(&mut self) {
        self.tool_calls = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_expected_roles() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
        let tool_msg = ChatMessage::tool_result("id1", "read_file", "done");
        assert_eq!(tool_msg.role, "tool");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("id1"));
    }

    #[test]
    fn context_advance_increments_depth_by_exactly_one() {
        let ctx = ToolCallContext::new();
        let next = ctx.advance(vec![], None);
        assert_eq!(next.depth, 1);
        let next2 = next.advance(vec![], None);
        assert_eq!(next2.depth, 2);
    }

    #[test]
    fn compactable_message_reports_stub_ids_and_emptiness() {
        let assistant = ChatMessage::assistant_with_tool_calls(
            None,
            vec![ToolCall::new("a", "read_file", "{}"), ToolCall::new("b", "", "{}")],
        );
        let ids = assistant.tool_call_stub_ids();
        assert_eq!(ids, vec![("a".to_string(), true), ("b".to_string(), false)]);
        assert!(!assistant.has_empty_tool_call_list());
    }
}
