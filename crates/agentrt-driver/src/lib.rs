//! The streaming chat-completion loop: an explicit iteration over a growing
//! message vector, so stack depth is bounded only by the configured depth
//! cap and never by the host language's call stack.

pub mod error;
pub mod llm;
pub mod message;
pub mod structured;

pub use error::InferError;
pub use llm::{AssembledResponse, LlmClient, LlmTransport, SamplingParams};
pub use message::{ChatMessage, FunctionCall, ToolCall, ToolCallContext};
pub use structured::{StructuredOutputFormat, StructuredOutputSpec};

use std::sync::Arc;
use std::time::SystemTime;

use agentrt_core::config::{DriverConfig, GovernorConfig};
use agentrt_core::rate_limit::RateLimiter;
use agentrt_governors::{enforce_history_invariants, optimize_text, CompletionDetector, CompletionSignal, ToolRepetitionDetector};
use agentrt_resources::Resources;
use agentrt_scheduler::{self, CallOutcome, PendingCall};
use agentrt_tools::ToolRegistry;
use serde_json::Value;
use tokio::sync::watch;

/// Maximum number of context-overflow recovery retries before giving up.
const MAX_CONTEXT_OVERFLOW_RETRIES: usize = 3;
const CONTEXT_OVERFLOW_RECOVERY_MAX_CHARS: usize = 2000;

/// What a completed (non-recursing-further) inference call returns.
#[derive(Debug, Clone)]
pub struct InferenceOutcome {
    pub content: Option<String>,
    pub context: ToolCallContext,
    pub completion: Option<CompletionSignal>,
    /// The schema-validated value, present only when the request carried a
    /// `structured_output` spec and finalization succeeded (§4.4).
    pub structured: Option<Value>,
}

/// Per-operation parameters (§4.4 "per-invocation inputs"). `action_key`
/// selects the depth cap; `user_id`/`model` select the rate-limit bucket.
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub action_key: &'a str,
    pub user_id: &'a str,
    pub sampling: SamplingParams,
    pub max_depth: u32,
    /// When set, the final turn's content (once no more tool calls are
    /// emitted) is parsed and validated against this schema rather than
    /// returned as free-form text (§4.4 "Structured-output finalization").
    pub structured_output: Option<&'a StructuredOutputSpec>,
}

/// Owns the state that lives for one top-level operation (typically one
/// user turn): the tool-repetition window and the completion-tool
/// configuration. A fresh `InferenceOperation` is created per operation;
/// `ToolRepetitionDetector::reset()` is never called implicitly — a
/// completion signal does not clear the repetition window.
pub struct InferenceOperation {
    client: Arc<dyn LlmTransport>,
    registry: Arc<ToolRegistry>,
    rate_limiter: Arc<dyn RateLimiter>,
    completion_detector: CompletionDetector,
    tool_repetition: ToolRepetitionDetector,
    driver_config: DriverConfig,
    governor_config: GovernorConfig,
}

impl InferenceOperation {
    pub fn new(
        client: impl LlmTransport + 'static,
        registry: Arc<ToolRegistry>,
        rate_limiter: Arc<dyn RateLimiter>,
        completion_tools: impl IntoIterator<Item = impl Into<String>>,
        driver_config: DriverConfig,
        governor_config: GovernorConfig,
    ) -> Self {
        Self {
            client: Arc::new(client),
            registry,
            rate_limiter,
            completion_detector: CompletionDetector::new(completion_tools),
            tool_repetition: ToolRepetitionDetector::with_params(
                std::time::Duration::from_secs(governor_config.tool_repetition_window_secs),
                governor_config.tool_repetition_threshold,
                governor_config.tool_repetition_capacity,
            ),
            driver_config,
            governor_config,
        }
    }

    /// Run the driver loop to completion. `on_chunk` receives streamed text
    /// as it arrives — the caller wires it to the text-repetition governor
    /// and any UI sink, per §4.4's streaming sink contract.
    pub async fn run(
        &mut self,
        mut messages: Vec<ChatMessage>,
        request: &InferenceRequest<'_>,
        cancel: &watch::Receiver<bool>,
        mut on_chunk: impl FnMut(&str) + Send,
    ) -> Result<InferenceOutcome, InferError> {
        let mut context = ToolCallContext::new();
        let mut context_overflow_retries = 0usize;

        loop {
            // Guard 1: message-count cap.
            if messages.len() + context.messages.len() > self.driver_config.max_llm_messages {
                return Err(InferError::RateLimitExceeded(format!(
                    "conversation exceeds MAX_LLM_MESSAGES ({})",
                    self.driver_config.max_llm_messages
                )));
            }

            // Guard 2: depth cap (I7). Structured-output calls raise so the
            // caller can't mistake a synthetic string for a validated value;
            // free-form calls get a synthetic explanation instead (§4.4, §7).
            if context.depth >= request.max_depth {
                if request.structured_output.is_some() {
                    return Err(InferError::DepthExceeded { context: Box::new(context) });
                }
                return Ok(InferenceOutcome {
                    content: Some(format!(
                        "Maximum recursion depth ({}) reached for action `{}`; stopping without a final answer.",
                        request.max_depth, request.action_key
                    )),
                    context,
                    completion: None,
                    structured: None,
                });
            }

            // Guard 3: per-user per-model rate limit.
            self.rate_limiter
                .check_and_record(request.user_id, request.model)
                .map_err(|e| InferError::RateLimitExceeded(e.to_string()))?;

            // History grafting with orphan cleanup (M1-M3, I1) + history
            // optimization (R2) before every request.
            let mut request_messages = messages.clone();
            request_messages.extend(context.messages.clone());
            let dropped = enforce_history_invariants(&mut request_messages);
            if dropped > 0 {
                tracing::debug!(dropped, "dropped orphaned tool messages while grafting history");
            }
            for message in request_messages.iter_mut() {
                if let Some(content) = &mut message.content {
                    *content = optimize_text(content);
                }
            }

            let descriptors = self.registry.descriptors();
            let tools_ref = if descriptors.is_empty() { None } else { Some(descriptors.as_slice()) };

            let stream_governor = llm::StreamGovernorParams {
                chunk_size: self.driver_config.stream_chunk_size,
                text_repetition_check_interval: self.governor_config.text_repetition_check_interval,
                text_repetition_window: self.governor_config.text_repetition_window,
            };

            let response = match self
                .client
                .chat_completion_stream(request.model, &request_messages, tools_ref, &request.sampling, stream_governor, &mut on_chunk)
                .await
            {
                Ok(resp) => {
                    context_overflow_retries = 0;
                    resp
                }
                Err(InferError::Transport(msg)) if llm::is_context_overflow_error(&msg) => {
                    context_overflow_retries += 1;
                    if context_overflow_retries >= MAX_CONTEXT_OVERFLOW_RETRIES {
                        return Err(InferError::Transport(msg));
                    }
                    tracing::warn!(
                        attempt = context_overflow_retries,
                        max = MAX_CONTEXT_OVERFLOW_RETRIES,
                        "context overflow, truncating tool messages and retrying"
                    );
                    llm::truncate_tool_messages(&mut messages, CONTEXT_OVERFLOW_RECOVERY_MAX_CHARS);
                    continue;
                }
                // The governor's own abort is distinct from a user abort (§5):
                // it carries the caller's actual running context, not the
                // empty placeholder the stream layer had no access to.
                Err(InferError::TextRepetition { accumulated_content, .. }) => {
                    return Err(InferError::TextRepetition {
                        accumulated_content,
                        context: Box::new(context),
                    });
                }
                Err(other) => return Err(other),
            };

            if *cancel.borrow() {
                return Err(InferError::UserAbort {
                    partial_content: response.content.unwrap_or_default(),
                    context: Box::new(context),
                });
            }

            if response.tool_calls.is_empty() {
                let structured = match request.structured_output {
                    Some(spec) => Some(structured::finalize(response.content.as_deref().unwrap_or(""), spec)?),
                    None => None,
                };
                return Ok(InferenceOutcome {
                    content: response.content,
                    context,
                    completion: None,
                    structured,
                });
            }

            let pending: Vec<PendingCall> = response
                .tool_calls
                .iter()
                .map(|tc| PendingCall {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    raw_arguments: tc.function.arguments.clone(),
                })
                .collect();

            let results = agentrt_scheduler::run_all(&self.registry, &pending, cancel).await;

            let assistant_message = ChatMessage::assistant_with_tool_calls(response.content.clone(), response.tool_calls.clone());
            let mut new_messages = vec![assistant_message];
            let mut executed: Vec<(String, Value)> = Vec::new();
            let mut any_produced_result = false;

            for result in &results {
                let (content_value, content_string) = render_outcome(&result.outcome);
                if !matches!(result.outcome, CallOutcome::Aborted(_)) {
                    any_produced_result = true;
                }

                let now = SystemTime::now();
                if let Some(parsed_args) = pending.iter().find(|p| p.id == result.id).and_then(|p| serde_json::from_str::<Value>(&p.raw_arguments).ok()) {
                    let prior_matches = self.tool_repetition.observe(&result.name, &parsed_args, now);
                    let warned = self.tool_repetition.maybe_warn(&result.name, prior_matches, content_value.clone());
                    let warned_string = if warned.is_string() {
                        warned.as_str().unwrap().to_string()
                    } else {
                        serde_json::to_string(&warned).unwrap_or_else(|_| content_string.clone())
                    };
                    new_messages.push(ChatMessage::tool_result(result.id.clone(), result.name.clone(), warned_string));
                    executed.push((result.name.clone(), warned));
                } else {
                    new_messages.push(ChatMessage::tool_result(result.id.clone(), result.name.clone(), content_string));
                    executed.push((result.name.clone(), content_value));
                }
            }

            let completion = self
                .completion_detector
                .scan(executed.iter().map(|(name, value)| (name.as_str(), value)));

            context = context.advance(new_messages, completion.clone());

            if let Some(signal) = completion {
                return Ok(InferenceOutcome {
                    content: response.content,
                    completion: Some(signal.clone()),
                    context,
                    structured: None,
                });
            }

            if !any_produced_result {
                return Ok(InferenceOutcome {
                    content: response.content,
                    context,
                    completion: None,
                    structured: None,
                });
            }
        }
    }
}

/// Render a scheduler outcome into the `(value, content-string)` pair the
/// driver needs: the raw JSON value (for completion-detector inspection and
/// loop-warning injection) and the wire-format string to place in the tool
/// message's `content` field. A nullish result becomes the literal `"done"`
/// (§4.4 recursion step).
fn render_outcome(outcome: &CallOutcome) -> (Value, String) {
    match outcome {
        CallOutcome::Success(value) => {
            if value.is_null() {
                (Value::Null, "done".to_string())
            } else {
                let s = serde_json::to_string(value).unwrap_or_default();
                (value.clone(), s)
            }
        }
        CallOutcome::ParseFailure(message) => {
            let value = serde_json::json!({ "error": message });
            (value.clone(), serde_json::to_string(&value).unwrap_or_default())
        }
        CallOutcome::HandlerFailure(message) => {
            let value = serde_json::json!({ "error": message });
            (value.clone(), serde_json::to_string(&value).unwrap_or_default())
        }
        CallOutcome::Aborted(message) => {
            let value = serde_json::json!({ "error": format!("aborted: {message}") });
            (value.clone(), serde_json::to_string(&value).unwrap_or_default())
        }
    }
}

/// Re-exported so callers wiring up tools don't need a direct
/// `agentrt-resources` dependency just for the conflict predicate.
pub use agentrt_resources::conflicts as resource_conflicts;
pub type ResourceFootprint = Resources;

#[cfg(test)]
mod tests {
    use super::*;
    use agentrt_core::config::{DriverConfig, GovernorConfig};
    use agentrt_core::rate_limit::NoopRateLimiter;
    use serde_json::json;

    #[test]
    fn render_outcome_maps_null_success_to_done() {
        let (value, content) = render_outcome(&CallOutcome::Success(Value::Null));
        assert_eq!(value, Value::Null);
        assert_eq!(content, "done");
    }

    #[test]
    fn render_outcome_wraps_handler_failure_as_error_object() {
        let (value, content) = render_outcome(&CallOutcome::HandlerFailure("boom".to_string()));
        assert_eq!(value["error"], json!("boom"));
        assert!(content.contains("boom"));
    }

    #[tokio::test]
    async fn operation_returns_content_when_no_tool_calls_are_emitted() {
        // This test exercises the guard/ordering logic around an
        // `InferenceOperation` without a live LLM transport: constructing the
        // operation and asserting its configuration wiring is consistent is
        // what's checked here, since a real HTTP call is out of scope for a
        // unit test. End-to-end streaming behavior is covered by the
        // integration tests against a stub transport below.
        let registry = Arc::new(ToolRegistry::builder().build());
        let op = InferenceOperation::new(
            LlmClient::new("http://localhost:0", "test-key"),
            registry,
            Arc::new(NoopRateLimiter),
            Vec::<String>::new(),
            DriverConfig::default(),
            GovernorConfig::default(),
        );
        assert_eq!(op.tool_repetition.warnings_issued(), 0);
    }

    // --- stub-transport integration tests (SPEC_FULL.md §D scenarios 1/2/4) ---

    use std::sync::Mutex;

    use agentrt_tools::{ArgSpec, Tool, ToolRunError};
    use async_trait::async_trait;

    struct StubTransport {
        responses: Mutex<std::collections::VecDeque<AssembledResponse>>,
    }

    impl StubTransport {
        fn new(responses: Vec<AssembledResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl LlmTransport for StubTransport {
        async fn chat_completion_stream(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[agentrt_tools::ToolDescriptor]>,
            _sampling: &SamplingParams,
            _governor: llm::StreamGovernorParams,
            on_chunk: &mut (dyn FnMut(&str) + Send),
        ) -> Result<AssembledResponse, InferError> {
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("stub transport called more times than responses were queued");
            if let Some(content) = &response.content {
                on_chunk(content);
            }
            Ok(response)
        }
    }

    fn stub_response(content: Option<&str>, tool_calls: Vec<ToolCall>) -> AssembledResponse {
        AssembledResponse {
            content: content.map(str::to_string),
            tool_calls,
            finish_reason: Some("stop".to_string()),
            usage: None,
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its `text` argument back"
        }
        fn args(&self) -> &[ArgSpec] {
            &[]
        }
        async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
            let text = parsed_args.get("text").cloned().unwrap_or(Value::Null);
            Ok(json!({ "echoed": text }))
        }
    }

    struct ReadTool;

    #[async_trait]
    impl Tool for ReadTool {
        fn name(&self) -> &str {
            "read"
        }
        fn description(&self) -> &str {
            "reads something"
        }
        fn args(&self) -> &[ArgSpec] {
            &[]
        }
        async fn run(&self, _parsed_args: Value) -> Result<Value, ToolRunError> {
            Ok(json!({ "contents": "file contents" }))
        }
    }

    struct MarkCompleteTool;

    #[async_trait]
    impl Tool for MarkCompleteTool {
        fn name(&self) -> &str {
            "mark_generation_complete"
        }
        fn description(&self) -> &str {
            "signals that generation is complete"
        }
        fn args(&self) -> &[ArgSpec] {
            &[]
        }
        async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
            let message = parsed_args.get("summary").and_then(Value::as_str).unwrap_or("done").to_string();
            Ok(json!({ "message": message, "filesGenerated": parsed_args.get("filesGenerated").cloned().unwrap_or(Value::Null) }))
        }
    }

    fn new_operation(transport: StubTransport, registry: Arc<ToolRegistry>, completion_tools: Vec<&str>) -> InferenceOperation {
        InferenceOperation::new(
            transport,
            registry,
            Arc::new(NoopRateLimiter),
            completion_tools,
            DriverConfig::default(),
            GovernorConfig::default(),
        )
    }

    fn default_request<'a>() -> InferenceRequest<'a> {
        InferenceRequest {
            model: "gpt-4o-mini",
            action_key: "default",
            user_id: "u1",
            sampling: SamplingParams::default(),
            max_depth: 10,
            structured_output: None,
        }
    }

    async fn run_with(op: InferenceOperation, messages: Vec<ChatMessage>) -> (Result<InferenceOutcome, InferError>, Vec<String>) {
        run_with_request(op, messages, &default_request()).await
    }

    async fn run_with_request(
        mut op: InferenceOperation,
        messages: Vec<ChatMessage>,
        request: &InferenceRequest<'_>,
    ) -> (Result<InferenceOutcome, InferError>, Vec<String>) {
        let (_tx, rx) = watch::channel(false);
        let mut chunks = Vec::new();
        let outcome = op.run(messages, request, &rx, |chunk: &str| chunks.push(chunk.to_string())).await;
        (outcome, chunks)
    }

    /// Scenario 1: happy path, no tools — the model answers directly and the
    /// loop returns without ever consulting the scheduler.
    #[tokio::test]
    async fn scenario_happy_path_returns_content_with_no_tool_calls() {
        let transport = StubTransport::new(vec![stub_response(Some("hi there"), vec![])]);
        let registry = Arc::new(ToolRegistry::builder().build());
        let op = new_operation(transport, registry, vec![]);

        let (outcome, chunks) = run_with(op, vec![ChatMessage::user("hello")]).await;
        let outcome = outcome.expect("scenario 1 should succeed");

        assert_eq!(outcome.content.as_deref(), Some("hi there"));
        assert_eq!(outcome.context.depth, 0);
        assert!(outcome.completion.is_none());
        assert_eq!(chunks, vec!["hi there".to_string()]);
    }

    /// Scenario 2: one tool call followed by a recursive step that answers
    /// directly — depth advances exactly once and the history tail matches
    /// the assistant/tool/assistant sequence the recursion step produces.
    #[tokio::test]
    async fn scenario_single_tool_call_recurses_once_then_completes() {
        let first_call = ToolCall::new("call_1", "echo", r#"{"text":"x"}"#);
        let transport = StubTransport::new(vec![
            stub_response(None, vec![first_call]),
            stub_response(Some("done"), vec![]),
        ]);
        let registry = Arc::new(ToolRegistry::builder().register(Arc::new(EchoTool)).build());
        let op = new_operation(transport, registry, vec![]);

        let (outcome, _) = run_with(op, vec![ChatMessage::user("echo x")]).await;
        let outcome = outcome.expect("scenario 2 should succeed");

        assert_eq!(outcome.content.as_deref(), Some("done"));
        assert_eq!(outcome.context.depth, 1);
        assert!(outcome.completion.is_none());

        let tail = &outcome.context.messages;
        assert_eq!(tail.len(), 2);
        assert!(tail[0].is_assistant_with_tool_calls());
        assert_eq!(tail[1].role, "tool");
        assert_eq!(tail[1].name.as_deref(), Some("echo"));
        assert_eq!(tail[1].content.as_deref(), Some(r#"{"echoed":"x"}"#));
    }

    /// Scenario 4: a completion-signal tool fires alongside another tool in
    /// the same batch. Both handlers run and both results are recorded, but
    /// the loop stops recursing — the transport is never asked for a second
    /// response.
    #[tokio::test]
    async fn scenario_completion_signal_short_circuits_without_a_second_call() {
        let complete_call = ToolCall::new("call_1", "mark_generation_complete", r#"{"summary":"s","filesGenerated":4}"#);
        let read_call = ToolCall::new("call_2", "read", "{}");
        let transport = StubTransport::new(vec![stub_response(None, vec![complete_call, read_call])]);
        let registry = Arc::new(
            ToolRegistry::builder()
                .register(Arc::new(MarkCompleteTool))
                .register(Arc::new(ReadTool))
                .completion_tool("mark_generation_complete")
                .build(),
        );
        let op = new_operation(transport, registry, vec!["mark_generation_complete"]);

        let (outcome, _) = run_with(op, vec![ChatMessage::user("generate the thing")]).await;
        let outcome = outcome.expect("scenario 4 should succeed");

        let signal = outcome.completion.expect("completion signal should have fired");
        assert_eq!(signal.tool_name, "mark_generation_complete");
        assert_eq!(signal.summary.as_deref(), Some("s"));
        assert_eq!(outcome.context.depth, 1);

        let tool_messages: Vec<&ChatMessage> = outcome.context.messages.iter().filter(|m| m.role == "tool").collect();
        assert_eq!(tool_messages.len(), 2, "both the completing tool and its batch-mate must still be recorded");
        assert_eq!(tool_messages[0].name.as_deref(), Some("mark_generation_complete"));
        assert_eq!(tool_messages[1].name.as_deref(), Some("read"));
    }

    /// §4.4 guard 2 / §7 DepthExceeded: a free-form call that hits the depth
    /// cap gets a synthetic explanation back instead of an error.
    #[tokio::test]
    async fn depth_guard_returns_synthetic_content_for_free_form_calls() {
        let call = ToolCall::new("call_1", "echo", r#"{"text":"x"}"#);
        let transport = StubTransport::new(vec![stub_response(None, vec![call])]);
        let registry = Arc::new(ToolRegistry::builder().register(Arc::new(EchoTool)).build());
        let op = new_operation(transport, registry, vec![]);

        let mut request = default_request();
        request.max_depth = 1;
        let (outcome, _) = run_with_request(op, vec![ChatMessage::user("echo x")], &request).await;
        let outcome = outcome.expect("free-form depth guard should not error");

        assert!(outcome.content.as_deref().unwrap().contains("Maximum recursion depth"));
        assert!(outcome.structured.is_none());
    }

    /// Same depth cap, but with structured output requested: the guard must
    /// raise `DepthExceeded` rather than hand back a synthetic string a
    /// caller could mistake for a validated value.
    #[tokio::test]
    async fn depth_guard_raises_for_structured_output_calls() {
        let call = ToolCall::new("call_1", "echo", r#"{"text":"x"}"#);
        let transport = StubTransport::new(vec![stub_response(None, vec![call])]);
        let registry = Arc::new(ToolRegistry::builder().register(Arc::new(EchoTool)).build());
        let op = new_operation(transport, registry, vec![]);

        let spec = StructuredOutputSpec {
            schema: json!({"type": "object"}),
            format: StructuredOutputFormat::StrictJson,
        };
        let mut request = default_request();
        request.max_depth = 1;
        request.structured_output = Some(&spec);
        let (outcome, _) = run_with_request(op, vec![ChatMessage::user("echo x")], &request).await;

        assert!(matches!(outcome, Err(InferError::DepthExceeded { .. })));
    }

    /// §4.4 structured-output finalization: the final turn's content is
    /// parsed and validated once no more tool calls are emitted.
    #[tokio::test]
    async fn structured_output_is_finalized_when_no_tool_calls_remain() {
        let transport = StubTransport::new(vec![stub_response(Some(r#"{"summary":"done"}"#), vec![])]);
        let registry = Arc::new(ToolRegistry::builder().build());
        let op = new_operation(transport, registry, vec![]);

        let spec = StructuredOutputSpec {
            schema: json!({
                "type": "object",
                "properties": {"summary": {"type": "string"}},
                "required": ["summary"],
            }),
            format: StructuredOutputFormat::StrictJson,
        };
        let mut request = default_request();
        request.structured_output = Some(&spec);
        let (outcome, _) = run_with_request(op, vec![ChatMessage::user("summarize")], &request).await;
        let outcome = outcome.expect("valid structured content should finalize");

        assert_eq!(outcome.structured.unwrap()["summary"], json!("done"));
    }

    /// A final turn whose content doesn't match the requested schema
    /// surfaces as a non-retryable `SchemaValidationFailure`.
    #[tokio::test]
    async fn structured_output_mismatch_is_a_schema_validation_failure() {
        let transport = StubTransport::new(vec![stub_response(Some(r#"{"oops":true}"#), vec![])]);
        let registry = Arc::new(ToolRegistry::builder().build());
        let op = new_operation(transport, registry, vec![]);

        let spec = StructuredOutputSpec {
            schema: json!({
                "type": "object",
                "properties": {"summary": {"type": "string"}},
                "required": ["summary"],
            }),
            format: StructuredOutputFormat::StrictJson,
        };
        let mut request = default_request();
        request.structured_output = Some(&spec);
        let (outcome, _) = run_with_request(op, vec![ChatMessage::user("summarize")], &request).await;

        let err = outcome.expect_err("schema mismatch should fail");
        assert!(matches!(err, InferError::SchemaValidationFailure { .. }));
        assert!(err.is_terminal());
    }
}
