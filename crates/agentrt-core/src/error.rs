//! Shared error taxonomy (§7).
//!
//! Variants that don't need a crate-specific payload (recursion context,
//! partial streamed content) live here so every crate in the workspace can
//! share one vocabulary. `agentrt-driver` wraps these in its own
//! `DriverError`, adding the variants that carry a `ToolCallContext`.

use thiserror::Error;

/// Errors that are never caught by the runtime — they propagate straight to
/// the caller per §7's propagation policy.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Message-count cap or per-user/per-model LLM quota exceeded.
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid input shape or forbidden resource access.
    #[error("security error: {0}")]
    SecurityError(String),

    /// Structured output did not match the requested schema. Non-retryable;
    /// carries the raw content for diagnostics.
    #[error("schema validation failed: {message}")]
    SchemaValidationFailure { message: String, raw_content: String },
}

impl CoreError {
    /// True for errors §7 says are never retried by the runtime.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CoreError::RateLimitExceeded(_) | CoreError::SecurityError(_)
        )
    }
}
