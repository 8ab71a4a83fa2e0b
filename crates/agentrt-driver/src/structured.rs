//! Structured-output finalization (§4.4 "Structured-output finalization").
//!
//! When the caller requests structured output and the model's final turn
//! produces content with no further tool calls, that content is parsed per
//! the requested wire format and validated against the caller's schema using
//! the same `jsonschema`-crate idiom the teacher's tool-argument validator
//! uses (`agents/src/registry.rs`'s `validate_arguments`): compile the
//! schema, collect `iter_errors`, and treat an uncompilable schema as a
//! graceful skip rather than a hard failure.

use serde_json::Value;

use crate::error::InferError;

/// How the model is expected to wrap its structured-output JSON in its final
/// text content (§4.4 "either the requested wire format — JSON or Markdown —
/// or strict JSON").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredOutputFormat {
    /// The entire content is expected to be a strict JSON document.
    StrictJson,
    /// The JSON is expected inside a fenced Markdown code block (` ```json
    /// ... ``` ` or a bare ` ``` ... ``` `).
    Markdown,
}

/// Per-invocation structured-output request (§4.4).
#[derive(Debug, Clone)]
pub struct StructuredOutputSpec {
    pub schema: Value,
    pub format: StructuredOutputFormat,
}

/// Parse `content` per `spec.format` and validate the result against
/// `spec.schema`. Either a parse failure or a schema mismatch is surfaced as
/// a non-retryable `SchemaValidationFailure` carrying the raw content for
/// diagnostics (§7).
pub fn finalize(content: &str, spec: &StructuredOutputSpec) -> Result<Value, InferError> {
    let extracted = match spec.format {
        StructuredOutputFormat::StrictJson => content,
        StructuredOutputFormat::Markdown => extract_fenced_json(content).unwrap_or(content),
    };

    let parsed: Value = serde_json::from_str(extracted.trim()).map_err(|e| InferError::SchemaValidationFailure {
        message: format!("content is not valid JSON: {e}"),
        raw_content: content.to_string(),
    })?;

    let Ok(validator) = jsonschema::validator_for(&spec.schema) else {
        // Graceful skip, mirroring the teacher's tool-argument validator: an
        // uncompilable schema should not block a result the caller already
        // has in hand.
        return Ok(parsed);
    };

    let errors: Vec<String> = validator.iter_errors(&parsed).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(InferError::SchemaValidationFailure {
            message: errors.join("; "),
            raw_content: content.to_string(),
        })
    }
}

/// Pull the body out of the first fenced code block in `content`. Returns
/// `None` if no closed fence is found, in which case the caller falls back
/// to treating the whole string as JSON.
fn extract_fenced_json(content: &str) -> Option<&str> {
    let start_fence = content.find("```")?;
    let after_open = &content[start_fence + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": { "summary": { "type": "string" } },
            "required": ["summary"],
        })
    }

    #[test]
    fn strict_json_validates_against_schema() {
        let spec = StructuredOutputSpec { schema: schema(), format: StructuredOutputFormat::StrictJson };
        let parsed = finalize(r#"{"summary":"done"}"#, &spec).unwrap();
        assert_eq!(parsed["summary"], json!("done"));
    }

    #[test]
    fn strict_json_rejects_non_json_content() {
        let spec = StructuredOutputSpec { schema: schema(), format: StructuredOutputFormat::StrictJson };
        let err = finalize("not json at all", &spec).unwrap_err();
        match err {
            InferError::SchemaValidationFailure { raw_content, .. } => assert_eq!(raw_content, "not json at all"),
            other => panic!("expected SchemaValidationFailure, got {other:?}"),
        }
    }

    #[test]
    fn strict_json_rejects_schema_mismatch() {
        let spec = StructuredOutputSpec { schema: schema(), format: StructuredOutputFormat::StrictJson };
        let err = finalize(r#"{"other":"field"}"#, &spec).unwrap_err();
        assert!(matches!(err, InferError::SchemaValidationFailure { .. }));
    }

    #[test]
    fn markdown_extracts_fenced_json_block() {
        let spec = StructuredOutputSpec { schema: schema(), format: StructuredOutputFormat::Markdown };
        let content = "Here is the result:\n```json\n{\"summary\": \"ok\"}\n```\n";
        let parsed = finalize(content, &spec).unwrap();
        assert_eq!(parsed["summary"], json!("ok"));
    }

    #[test]
    fn markdown_falls_back_to_raw_content_without_a_fence() {
        let spec = StructuredOutputSpec { schema: schema(), format: StructuredOutputFormat::Markdown };
        let parsed = finalize(r#"{"summary":"no fence"}"#, &spec).unwrap();
        assert_eq!(parsed["summary"], json!("no fence"));
    }
}
