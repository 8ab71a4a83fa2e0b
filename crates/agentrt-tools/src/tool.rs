//! The tool definition contract (§4.2, §9 "Polymorphic tool definitions →
//! interface with closures").
//!
//! A `Tool` is polymorphic over its argument and result shapes at the
//! language level; uniformity for the registry/scheduler is achieved by
//! erasing to this runtime-dispatched trait object, exactly as the source
//! design's duck-typed tool objects did.

use agentrt_resources::Resources;
use async_trait::async_trait;
use serde_json::Value;

use crate::schema::{json_schema, resolve_arg_resources, ArgSpec};

/// A tool's result: arbitrary JSON-serializable value or `null` (§6).
pub type ToolOutcome = Value;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> &[ArgSpec];

    /// Resolve this call's resource footprint. The default mechanically
    /// unions each declared argument's contribution (§4.1); override only
    /// when a tool's footprint depends on cross-argument interaction.
    fn resolve_resources(&self, parsed_args: &Value) -> Resources {
        let obj = parsed_args.as_object();
        self.args()
            .iter()
            .map(|spec| {
                let value = obj
                    .and_then(|o| o.get(&spec.name))
                    .cloned()
                    .unwrap_or(Value::Null);
                resolve_arg_resources(&spec.kind, &value)
            })
            .fold(Resources::none(), |acc, r| acc.merge(&r))
    }

    /// Execute the tool. Implementations should be cancel-safe: on the
    /// cooperative cancellation signal they should return promptly rather
    /// than run to completion (§5 Cancellation semantics).
    async fn run(&self, parsed_args: Value) -> Result<ToolOutcome, ToolRunError>;

    /// Lifecycle hook fired before dispatch (UI rendering, loop-detector
    /// bookkeeping, history mirroring).
    fn on_start(&self, _parsed_args: &Value) {}

    /// Lifecycle hook fired after the handler returns (success or error).
    fn on_complete(&self, _outcome: &Result<ToolOutcome, ToolRunError>) {}

    /// JSON schema `parameters` fragment exposed to the LLM.
    fn parameters_schema(&self) -> Value {
        json_schema(self.args())
    }
}

/// A handler-level failure (§7 ToolHandlerFailure). The scheduler turns this
/// into `{"error": message}` in the tool's result rather than propagating it.
#[derive(Debug, thiserror::Error)]
pub enum ToolRunError {
    #[error("{0}")]
    Failed(String),
    /// The handler cooperatively aborted; the scheduler stops the wave and
    /// the driver treats this as an early-but-clean return (§4.3).
    #[error("aborted: {0}")]
    Aborted(String),
}
