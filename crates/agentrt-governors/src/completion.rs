//! Completion Detector (§4.5, I6).
//!
//! Scans a batch of *executed* tool calls (in order) for the first one whose
//! name is in the configured completion-tool set. The driver uses the
//! resulting signal to stop recursing even though every call in the batch
//! still gets its result recorded in history.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Produced when a completion-signal tool fires (§3 CompletionSignal). `fired`
/// is always `true` for a constructed signal — the type itself is the
/// "fired" case; callers hold `Option<CompletionSignal>` rather than a
/// separate boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSignal {
    pub fired: bool,
    pub tool_name: String,
    pub summary: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct CompletionDetector {
    completion_tools: HashSet<String>,
}

impl CompletionDetector {
    pub fn new(completion_tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            completion_tools: completion_tools.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_completion_tool(&self, name: &str) -> bool {
        self.completion_tools.contains(name)
    }

    /// Scan `executed` — pairs of (tool name, result value) in the order the
    /// scheduler dispatched them — and return the first completion signal,
    /// if any. The `message` field of a matching result becomes the summary
    /// when present and string-valued (§6 Tool result).
    pub fn scan<'a>(&self, executed: impl IntoIterator<Item = (&'a str, &'a Value)>) -> Option<CompletionSignal> {
        for (name, result) in executed {
            if self.completion_tools.contains(name) {
                let summary = result
                    .as_object()
                    .and_then(|obj| obj.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                return Some(CompletionSignal {
                    fired: true,
                    tool_name: name.to_string(),
                    summary,
                    timestamp: Utc::now(),
                });
            }
        }
        None
    }
}
