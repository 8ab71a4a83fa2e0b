//! Streaming OpenAI-compatible chat-completions client and the tool-call
//! delta accumulator (§4.4, §6, I2).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use agentrt_governors::TextRepetitionDetector;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::InferError;
use crate::message::{ChatMessage, ToolCall};

/// The LLM transport boundary (§6). `agentrt-driver` depends only on this
/// trait, not on `reqwest` directly — production code wires in `LlmClient`;
/// tests wire in a stub that returns canned `AssembledResponse`s without a
/// live HTTP endpoint (SPEC_FULL.md §D).
#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn chat_completion_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[agentrt_tools::ToolDescriptor]>,
        sampling: &SamplingParams,
        governor: StreamGovernorParams,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<AssembledResponse, InferError>;
}

/// Parameters the text-repetition governor needs to wrap a stream (§4.5).
/// Constructed fresh per request — the governor's local abort is scoped to
/// one in-flight stream, not chained across turns.
#[derive(Debug, Clone, Copy)]
pub struct StreamGovernorParams {
    pub chunk_size: usize,
    pub text_repetition_check_interval: usize,
    pub text_repetition_window: usize,
}

impl Default for StreamGovernorParams {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            text_repetition_check_interval: 50,
            text_repetition_window: 4000,
        }
    }
}

/// Non-reasoning models do not accept a `reasoning_effort` field. Anything
/// not in this table is assumed to be a reasoning model and gets the field.
const NON_REASONING_MODEL_PREFIXES: &[&str] = &["gpt-4o", "gpt-4-", "gpt-3.5", "claude-3", "gemini-1.5"];

pub fn is_non_reasoning_model(model: &str) -> bool {
    NON_REASONING_MODEL_PREFIXES.iter().any(|prefix| model.starts_with(prefix))
}

/// Heuristic context-overflow detection over a transport error message, used
/// to decide whether to retry with truncated history.
pub fn is_context_overflow_error(message: &str) -> bool {
    let lowered = message.to_lowercase();
    ["context length", "context_length_exceeded", "maximum context", "too many tokens", "context window"]
        .iter()
        .any(|needle| lowered.contains(needle))
}

/// Truncate every tool-role message's content to at most `max_chars`,
/// replacing the tail with a marker so the model can tell truncation
/// happened. Used as the bounded recovery step after a context-overflow
/// transport error.
pub fn truncate_tool_messages(messages: &mut [ChatMessage], max_chars: usize) {
    for message in messages.iter_mut() {
        if message.role != "tool" {
            continue;
        }
        if let Some(content) = &mut message.content {
            if content.chars().count() > max_chars {
                let original_len = content.chars().count();
                let truncated: String = content.chars().take(max_chars).collect();
                *content = format!("{truncated}\n[truncated: {original_len} chars -> {max_chars}]");
            }
        }
    }
}

pub struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

}

#[async_trait]
impl LlmTransport for LlmClient {
    /// Stream a chat completion, feeding text chunks to `on_chunk` as they
    /// arrive (the streaming sink of §4.4 — the caller wires this to the
    /// text-repetition governor and any UI sink) and returning the fully
    /// assembled response once the stream ends.
    async fn chat_completion_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[agentrt_tools::ToolDescriptor]>,
        sampling: &SamplingParams,
        governor: StreamGovernorParams,
        on_chunk: &mut (dyn FnMut(&str) + Send),
    ) -> Result<AssembledResponse, InferError> {
        let url = format!("{}/chat/completions", self.api_base);
        let mut body = json!({
            "model": model,
            "messages": messages,
            "stream": true,
            "max_completion_tokens": sampling.max_completion_tokens,
        });

        if let Some(temp) = sampling.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(fp) = sampling.frequency_penalty {
            body["frequency_penalty"] = json!(fp);
        }
        if let Some(effort) = &sampling.reasoning_effort {
            if !is_non_reasoning_model(model) {
                body["reasoning_effort"] = json!(effort);
            }
        }
        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = serde_json::to_value(tools).map_err(|e| InferError::Transport(e.to_string()))?;
                body["tool_choice"] = json!("auto");
            }
        }

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InferError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(InferError::Transport(format!("LLM API error ({status}): {text}")));
        }

        accumulate_stream(resp, governor, on_chunk).await
    }
}

#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub temperature: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub reasoning_effort: Option<String>,
    pub max_completion_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: None,
            frequency_penalty: None,
            reasoning_effort: None,
            max_completion_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// The fully-assembled result of draining one streaming response.
#[derive(Debug, Clone)]
pub struct AssembledResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// One tool-call delta accumulator entry (§4.4 step 1–5).
struct Entry {
    id: String,
    index: Option<usize>,
    insertion_order: usize,
    name: String,
    arguments: String,
    /// Once the accumulated argument string parses as complete JSON, further
    /// argument chunks are discarded (duplicate protection, §4.4 step 5).
    arguments_complete: bool,
}

/// Two-keyed (by index, by id) accumulator with provisional-id rebinding
/// (I2: the assembled list always matches the model's intended order).
#[derive(Default)]
struct DeltaAccumulator {
    entries: Vec<Entry>,
    by_index: HashMap<usize, usize>,
    by_id: HashMap<String, usize>,
    next_order: usize,
}

impl DeltaAccumulator {
    fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, delta: &Value) {
        let id = delta.get("id").and_then(Value::as_str);
        let index = delta.get("index").and_then(Value::as_u64).map(|i| i as usize);

        let entry_idx = self.locate_or_create(id, index);
        let entry = &mut self.entries[entry_idx];

        if let Some(index) = index {
            if entry.index.is_none() {
                entry.index = Some(index);
                self.by_index.insert(index, entry_idx);
            }
        }

        if let Some(id) = id {
            if entry.id != id && !id.is_empty() {
                // A real id arrived after we created a provisional one: rebind.
                self.by_id.remove(&entry.id.clone());
                entry.id = id.to_string();
                self.by_id.insert(id.to_string(), entry_idx);
            }
        }

        if let Some(function) = delta.get("function") {
            if let Some(name) = function.get("name").and_then(Value::as_str) {
                if !name.is_empty() {
                    entry.name = name.to_string();
                }
            }
            if let Some(args) = function.get("arguments").and_then(Value::as_str) {
                if entry.arguments_complete {
                    tracing::debug!(tool_call_id = %entry.id, "discarding argument chunk after complete JSON");
                } else {
                    entry.arguments.push_str(args);
                    if serde_json::from_str::<Value>(&entry.arguments).is_ok() {
                        entry.arguments_complete = true;
                    }
                }
            }
        }
    }

    fn locate_or_create(&mut self, id: Option<&str>, index: Option<usize>) -> usize {
        if let Some(index) = index {
            if let Some(&idx) = self.by_index.get(&index) {
                return idx;
            }
        }
        if let Some(id) = id {
            if !id.is_empty() {
                if let Some(&idx) = self.by_id.get(id) {
                    return idx;
                }
            }
        }

        let provisional_id = id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| provisional_tool_call_id(index, self.entries.len()));
        let order = self.next_order;
        self.next_order += 1;

        let entry_idx = self.entries.len();
        self.entries.push(Entry {
            id: provisional_id.clone(),
            index,
            insertion_order: order,
            name: String::new(),
            arguments: String::new(),
            arguments_complete: false,
        });
        self.by_id.insert(provisional_id, entry_idx);
        if let Some(index) = index {
            self.by_index.insert(index, entry_idx);
        }
        entry_idx
    }

    /// §4.4 "assemble the final tool-call list": sort by index when any
    /// entry carries one, otherwise by insertion order; drop empty names.
    fn finish(self) -> Vec<ToolCall> {
        let mut entries: Vec<Entry> = self.entries;
        let any_indexed = entries.iter().any(|e| e.index.is_some());
        if any_indexed {
            entries.sort_by_key(|e| e.index.unwrap_or(usize::MAX));
        } else {
            entries.sort_by_key(|e| e.insertion_order);
        }
        entries
            .into_iter()
            .filter(|e| !e.name.is_empty())
            .map(|e| ToolCall::new(e.id, e.name, e.arguments))
            .collect()
    }
}

fn provisional_tool_call_id(index: Option<usize>, position: usize) -> String {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    let slot = index.unwrap_or(position);
    let rand = &uuid::Uuid::new_v4().simple().to_string()[..8];
    format!("tool_{timestamp}_{slot}_{rand}")
}

/// Transport-agnostic core of stream assembly: parses one SSE `data:` line at
/// a time, batches outbound text by `chunk_size` (§4.4), and runs the
/// in-flight text-repetition probe (§4.5, §5) on every content fragment.
/// Factored out of `accumulate_stream` so it can be driven directly by tests
/// with literal SSE lines instead of a live `reqwest::Response`.
struct StreamState<'a> {
    content: String,
    accumulator: DeltaAccumulator,
    finish_reason: Option<String>,
    usage: Option<Usage>,
    pending_flush: String,
    chunk_size: usize,
    repetition: TextRepetitionDetector,
    on_chunk: &'a mut (dyn FnMut(&str) + Send),
}

impl<'a> StreamState<'a> {
    fn new(governor: StreamGovernorParams, on_chunk: &'a mut (dyn FnMut(&str) + Send)) -> Self {
        Self {
            content: String::new(),
            accumulator: DeltaAccumulator::new(),
            finish_reason: None,
            usage: None,
            pending_flush: String::new(),
            chunk_size: governor.chunk_size,
            repetition: TextRepetitionDetector::with_params(
                governor.text_repetition_check_interval,
                governor.text_repetition_window,
            ),
            on_chunk,
        }
    }

    fn flush(&mut self) {
        if !self.pending_flush.is_empty() {
            (self.on_chunk)(&self.pending_flush);
            self.pending_flush.clear();
        }
    }

    /// Process one trimmed line of the SSE body. Returns `Err` only for the
    /// text-repetition abort — malformed/irrelevant lines are skipped.
    fn process_line(&mut self, line: &str) -> Result<(), InferError> {
        if line.is_empty() || line.starts_with(':') || !line.starts_with("data: ") {
            return Ok(());
        }
        let data = &line[6..];
        if data == "[DONE]" {
            return Ok(());
        }

        let event: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(_) => return Ok(()),
        };

        if let Some(u) = event.get("usage") {
            if !u.is_null() {
                self.usage = serde_json::from_value(u.clone()).ok();
            }
        }

        let Some(choices) = event.get("choices").and_then(Value::as_array) else {
            return Ok(());
        };
        for choice in choices {
            if let Some(fr) = choice.get("finish_reason").and_then(Value::as_str) {
                self.finish_reason = Some(fr.to_string());
            }
            let Some(delta) = choice.get("delta") else {
                continue;
            };
            if let Some(text) = delta.get("content").and_then(Value::as_str) {
                self.content.push_str(text);
                self.pending_flush.push_str(text);
                if self.pending_flush.len() >= self.chunk_size {
                    self.flush();
                }
                if self.repetition.push(text).is_some() {
                    self.flush();
                    return Err(InferError::TextRepetition {
                        accumulated_content: self.content.clone(),
                        context: Box::new(crate::message::ToolCallContext::new()),
                    });
                }
            }
            if let Some(tool_deltas) = delta.get("tool_calls").and_then(Value::as_array) {
                for tc_delta in tool_deltas {
                    self.accumulator.apply(tc_delta);
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> AssembledResponse {
        self.flush();
        AssembledResponse {
            content: if self.content.is_empty() { None } else { Some(self.content) },
            tool_calls: self.accumulator.finish(),
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}

async fn accumulate_stream(
    resp: reqwest::Response,
    governor: StreamGovernorParams,
    on_chunk: &mut (dyn FnMut(&str) + Send),
) -> Result<AssembledResponse, InferError> {
    let mut state = StreamState::new(governor, on_chunk);
    let mut buffer = String::new();
    let mut stream = resp.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| InferError::Transport(e.to_string()))?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline_pos) = buffer.find('\n') {
            let line = buffer[..newline_pos].trim().to_string();
            buffer = buffer[newline_pos + 1..].to_string();
            state.process_line(&line)?;
        }
    }

    Ok(state.finish())
}
