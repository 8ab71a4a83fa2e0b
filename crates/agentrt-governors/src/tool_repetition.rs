//! Tool-repetition detector (§4.5, I8, R1).
//!
//! Before a tool's handler runs, its arguments are canonicalized and recorded
//! in a sliding window keyed by `(toolName, canonicalArgs)`. If two or more
//! prior records match the call about to run, the third (and every
//! subsequent) occurrence is a loop: a warning is injected into the tool's
//! own result so the model sees it on its own next turn.

use std::collections::VecDeque;
use std::time::{Duration, SystemTime};

use serde_json::{Map, Value};

const DEFAULT_WINDOW: Duration = Duration::from_secs(120);
const DEFAULT_THRESHOLD: usize = 2;
const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
struct Record {
    tool_name: String,
    canonical_args: String,
    recorded_at: SystemTime,
}

/// Sliding-window detector for identical tool invocations.
pub struct ToolRepetitionDetector {
    window: Duration,
    threshold: usize,
    capacity: usize,
    records: VecDeque<Record>,
    warnings_issued: usize,
}

impl ToolRepetitionDetector {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_WINDOW, DEFAULT_THRESHOLD, DEFAULT_CAPACITY)
    }

    pub fn with_params(window: Duration, threshold: usize, capacity: usize) -> Self {
        Self {
            window,
            threshold,
            capacity,
            records: VecDeque::new(),
            warnings_issued: 0,
        }
    }

    pub fn warnings_issued(&self) -> usize {
        self.warnings_issued
    }

    /// The spec's documented reset hook. Per the open question in §9, a
    /// completion signal does *not* implicitly call this — only an explicit
    /// reset (e.g. a new top-level operation) does.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    fn expire(&mut self, now: SystemTime) {
        while let Some(front) = self.records.front() {
            match now.duration_since(front.recorded_at) {
                Ok(age) if age > self.window => {
                    self.records.pop_front();
                }
                _ => break,
            }
        }
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    /// Record this call and return the matching prior-record count *before*
    /// this call was recorded. R1: calling this twice with already-canonical
    /// args yields the same canonicalization both times.
    pub fn observe(&mut self, tool_name: &str, args: &Value, now: SystemTime) -> usize {
        self.expire(now);
        let canonical_args = canonicalize(args);
        let prior_matches = self
            .records
            .iter()
            .filter(|r| r.tool_name == tool_name && r.canonical_args == canonical_args)
            .count();

        self.records.push_back(Record {
            tool_name: tool_name.to_string(),
            canonical_args,
            recorded_at: now,
        });
        if self.records.len() > self.capacity {
            self.records.pop_front();
        }
        prior_matches
    }

    /// Given the prior-match count from `observe`, decide whether to inject a
    /// warning into this call's result, and do so.
    pub fn maybe_warn(&mut self, tool_name: &str, prior_matches: usize, outcome: Value) -> Value {
        if prior_matches < self.threshold {
            return outcome;
        }
        self.warnings_issued += 1;
        inject_warning(tool_name, outcome)
    }
}

impl Default for ToolRepetitionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort object keys lexicographically (recursively) and serialize. Falls
/// back to a shape fingerprint (type tag + key count) if serialization
/// somehow fails — `serde_json::Value` cannot itself contain cycles, but
/// handler-supplied values are treated defensively per the spec's "handling
/// cycles" clause.
fn canonicalize(value: &Value) -> String {
    let sorted = sort_keys(value);
    serde_json::to_string(&sorted).unwrap_or_else(|_| shape_fingerprint(value))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn shape_fingerprint(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object/{}", map.len()),
        Value::Array(items) => format!("array/{}", items.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}

const WARNING_TEMPLATE: &str =
    "loop detected: `{tool}` has now been called with identical arguments 3+ times in the last 2 minutes. \
     Call the completion tool, stop, or change your approach.";

fn inject_warning(tool_name: &str, outcome: Value) -> Value {
    let warning = WARNING_TEMPLATE.replace("{tool}", tool_name);
    match outcome {
        Value::String(s) => Value::String(format!("{warning}\n\n{s}")),
        Value::Object(mut map) => {
            map.insert("loopWarning".to_string(), Value::String(warning));
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("loopWarning".to_string(), Value::String(warning));
            map.insert("result".to_string(), other);
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalization_is_idempotent() {
        let args = json!({"b": 1, "a": {"d": 2, "c": 3}});
        let once = canonicalize(&args);
        let parsed: Value = serde_json::from_str(&once).unwrap();
        let twice = canonicalize(&parsed);
        assert_eq!(once, twice);
    }

    #[test]
    fn key_order_does_not_affect_canonical_form() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn third_identical_call_triggers_warning() {
        let mut detector = ToolRepetitionDetector::new();
        let now = SystemTime::now();
        let args = json!({"path": "p", "issues": ["i"]});

        let m1 = detector.observe("regenerate_file", &args, now);
        assert_eq!(m1, 0);
        let r1 = detector.maybe_warn("regenerate_file", m1, json!({"message": "ok"}));
        assert!(!r1.as_object().unwrap().contains_key("loopWarning"));

        let m2 = detector.observe("regenerate_file", &args, now);
        assert_eq!(m2, 1);
        let r2 = detector.maybe_warn("regenerate_file", m2, json!({"message": "ok"}));
        assert!(!r2.as_object().unwrap().contains_key("loopWarning"));

        let m3 = detector.observe("regenerate_file", &args, now);
        assert_eq!(m3, 2);
        let r3 = detector.maybe_warn("regenerate_file", m3, json!({"message": "ok"}));
        assert!(r3.as_object().unwrap().contains_key("loopWarning"));
        assert_eq!(detector.warnings_issued(), 1);
    }

    #[test]
    fn string_result_gets_warning_prepended() {
        let mut detector = ToolRepetitionDetector::with_params(Duration::from_secs(120), 0, 1000);
        let warned = detector.maybe_warn("t", 5, json!("original"));
        assert!(warned.as_str().unwrap().starts_with("loop detected"));
        assert!(warned.as_str().unwrap().ends_with("original"));
    }

    #[test]
    fn entries_older_than_window_expire() {
        let mut detector = ToolRepetitionDetector::new();
        let t0 = SystemTime::now();
        let args = json!({"path": "p"});
        detector.observe("t", &args, t0);
        let later = t0 + Duration::from_secs(121);
        let matches = detector.observe("t", &args, later);
        assert_eq!(matches, 0);
    }

    #[test]
    fn capacity_caps_the_window() {
        let mut detector = ToolRepetitionDetector::with_params(Duration::from_secs(120), 2, 3);
        let t0 = SystemTime::now();
        for i in 0..5 {
            detector.observe("t", &json!({"n": i}), t0);
        }
        assert!(detector.records.len() <= 3);
    }

    #[test]
    fn reset_clears_the_window() {
        let mut detector = ToolRepetitionDetector::new();
        let t0 = SystemTime::now();
        detector.observe("t", &json!({}), t0);
        detector.reset();
        let matches = detector.observe("t", &json!({}), t0);
        assert_eq!(matches, 0);
    }
}
