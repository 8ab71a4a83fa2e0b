//! §7 Error taxonomy.

use thiserror::Error;

use crate::message::ToolCallContext;

/// Errors the Driver can raise. `RateLimitExceeded`, `SecurityError`,
/// `DepthExceeded` (structured-output path), and `SchemaValidationFailure`
/// are non-retryable; `UserAbort` and `TextRepetition` carry partial state
/// the caller can act on; `ToolParseFailure`/`ToolHandlerFailure` never
/// reach this type — they are recorded as tool-result content instead and
/// the recursion continues (§7 propagation policy).
#[derive(Debug, Error)]
pub enum InferError {
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("security error: {0}")]
    SecurityError(String),

    #[error("recursion depth exceeded")]
    DepthExceeded { context: Box<ToolCallContext> },

    #[error("aborted by caller")]
    UserAbort { partial_content: String, context: Box<ToolCallContext> },

    #[error("text repetition detected")]
    TextRepetition { accumulated_content: String, context: Box<ToolCallContext> },

    #[error("structured output did not match the requested schema: {message}")]
    SchemaValidationFailure { message: String, raw_content: String },

    #[error("llm transport error: {0}")]
    Transport(String),
}

impl InferError {
    /// §7 propagation policy: rate-limit and security errors are never
    /// caught by the runtime; everything else may be retried or recovered.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InferError::RateLimitExceeded(_) | InferError::SecurityError(_) | InferError::SchemaValidationFailure { .. }
        )
    }

    /// Distinguishes the governor's own abort from a user-initiated one
    /// (§5): both unwind the stream, but only `TextRepetition` is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InferError::TextRepetition { .. })
    }
}
