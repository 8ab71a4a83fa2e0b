//! Conversation compactor (§1.4 data flow, M1–M3, I1, R2).
//!
//! History assembly invariants — dropping orphaned tool messages, dropping
//! empty tool-call stubs, never carrying an empty `tool_calls` list — are
//! mechanical and message-shape-agnostic, so they are expressed here over a
//! small trait rather than against the driver's concrete `ChatMessage` type.
//! `agentrt-driver` implements `CompactableMessage` for its message enum and
//! calls these functions every time it assembles history for a request.

/// What the compactor needs to see of a message to enforce M1–M3 and R2. The
/// driver's concrete message type implements this; the compactor never
/// constructs or serializes messages itself.
pub trait CompactableMessage {
    /// `Some(id)` if this is a tool-role message, carrying its `tool_call_id`.
    fn tool_call_id(&self) -> Option<&str>;
    /// Ids stubbed on this message if it is an assistant message with tool
    /// calls (each id, paired with whether its function name is non-empty).
    fn tool_call_stub_ids(&self) -> Vec<(String, bool)>;
    /// True if this is an assistant message whose tool-call list is present
    /// but empty (the shape M3 forbids).
    fn has_empty_tool_call_list(&self) -> bool;
    /// Drop any empty-named stubs from this message's tool-call list (M2).
    /// For messages with no tool calls this is a no-op.
    fn drop_empty_tool_call_stubs(&mut self);
    /// Clear the tool-call list entirely so its absence, not an empty
    /// sequence, is what's serialized (M3).
    fn clear_tool_call_list(&mut self);
}

/// Enforce M1–M3 in place. Returns the number of messages dropped (orphan
/// tool messages) for observability.
pub fn enforce_history_invariants<M: CompactableMessage>(messages: &mut Vec<M>) -> usize {
    let mut valid_stub_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

    for message in messages.iter_mut() {
        message.drop_empty_tool_call_stubs(); // M2
        if message.has_empty_tool_call_list() {
            message.clear_tool_call_list(); // M3
        }
        for (id, non_empty_name) in message.tool_call_stub_ids() {
            if non_empty_name {
                valid_stub_ids.insert(id);
            }
        }
    }

    let before = messages.len();
    messages.retain(|message| match message.tool_call_id() {
        Some(id) => valid_stub_ids.contains(id), // M1
        None => true,
    });
    before - messages.len()
}

/// History optimization: trim trailing whitespace per line and collapse 4+
/// consecutive blank lines to 3 (R2: idempotent — running this twice is a
/// no-op the second time).
pub fn optimize_text(text: &str) -> String {
    let trimmed_lines: Vec<&str> = text.lines().map(|line| line.trim_end()).collect();
    let mut result = Vec::with_capacity(trimmed_lines.len());
    let mut blank_run = 0;

    for line in trimmed_lines {
        if line.is_empty() {
            blank_run += 1;
            if blank_run <= 3 {
                result.push(line);
            }
        } else {
            blank_run = 0;
            result.push(line);
        }
    }

    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Msg {
        tool_call_id: Option<String>,
        tool_calls: Option<Vec<(String, bool)>>,
    }

    impl CompactableMessage for Msg {
        fn tool_call_id(&self) -> Option<&str> {
            self.tool_call_id.as_deref()
        }
        fn tool_call_stub_ids(&self) -> Vec<(String, bool)> {
            self.tool_calls.clone().unwrap_or_default()
        }
        fn has_empty_tool_call_list(&self) -> bool {
            matches!(&self.tool_calls, Some(v) if v.is_empty())
        }
        fn drop_empty_tool_call_stubs(&mut self) {
            if let Some(calls) = &mut self.tool_calls {
                calls.retain(|(_, non_empty_name)| *non_empty_name);
            }
        }
        fn clear_tool_call_list(&mut self) {
            self.tool_calls = None;
        }
    }

    fn assistant_with(ids: &[(&str, bool)]) -> Msg {
        Msg {
            tool_call_id: None,
            tool_calls: Some(ids.iter().map(|(id, ok)| (id.to_string(), *ok)).collect()),
        }
    }

    fn tool_result(id: &str) -> Msg {
        Msg {
            tool_call_id: Some(id.to_string()),
            tool_calls: None,
        }
    }

    #[test]
    fn orphan_tool_message_is_dropped() {
        let mut messages = vec![tool_result("missing_stub")];
        let dropped = enforce_history_invariants(&mut messages);
        assert_eq!(dropped, 1);
        assert!(messages.is_empty());
    }

    #[test]
    fn tool_message_with_matching_stub_survives() {
        let mut messages = vec![assistant_with(&[("abc", true)]), tool_result("abc")];
        let dropped = enforce_history_invariants(&mut messages);
        assert_eq!(dropped, 0);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn empty_named_stub_is_dropped_and_orphans_its_tool_message() {
        let mut messages = vec![assistant_with(&[("abc", false)]), tool_result("abc")];
        enforce_history_invariants(&mut messages);
        // "abc" never became a valid stub id (empty name), so its tool
        // message is dropped.
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn assistant_message_with_only_empty_stubs_ends_with_no_tool_call_list() {
        let mut messages = vec![assistant_with(&[("abc", false)])];
        enforce_history_invariants(&mut messages);
        assert!(messages[0].tool_calls.is_none());
    }

    #[test]
    fn optimize_text_trims_trailing_whitespace() {
        assert_eq!(optimize_text("line one   \nline two\t\n"), "line one\nline two");
    }

    #[test]
    fn optimize_text_collapses_long_blank_runs() {
        let input = "a\n\n\n\n\n\nb";
        let optimized = optimize_text(input);
        assert_eq!(optimized, "a\n\n\n\nb");
    }

    #[test]
    fn optimize_text_is_idempotent() {
        let input = "a   \n\n\n\n\n\nb\t\n";
        let once = optimize_text(input);
        let twice = optimize_text(&once);
        assert_eq!(once, twice);
    }
}
