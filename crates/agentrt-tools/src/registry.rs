//! §4.2 Tool Registry.
//!
//! Tools are registered once at construction (builder pattern, mirroring the
//! extension-registry idiom this runtime is built on: add a tool module by
//! calling `.register(...)`, no changes needed elsewhere). The registry is
//! also where "completion-signal" tool names are configured (§4.5).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::tool::Tool;

/// Outbound tool descriptor in the `{type, function}` shape §6 specifies.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Registry of tool definitions plus the configured completion-signal set.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    completion_tools: HashSet<String>,
}

/// Builder for `ToolRegistry`. Pattern:
/// ```ignore
/// let registry = ToolRegistry::builder()
///     .register(Arc::new(ReadFileTool))
///     .register(Arc::new(WriteFileTool))
///     .completion_tool("mark_generation_complete")
///     .build();
/// ```
pub struct ToolRegistryBuilder {
    tools: HashMap<String, Arc<dyn Tool>>,
    completion_tools: HashSet<String>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            completion_tools: HashSet::new(),
        }
    }

    #[must_use]
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    #[must_use]
    pub fn register_all(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        for t in tools {
            self.tools.insert(t.name().to_string(), t);
        }
        self
    }

    /// Mark a registered (or not-yet-registered) tool name as a completion
    /// signal (§4.2, §4.5). The name need not already be registered — order
    /// of `register` vs `completion_tool` calls does not matter.
    #[must_use]
    pub fn completion_tool(mut self, name: impl Into<String>) -> Self {
        self.completion_tools.insert(name.into());
        self
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            completion_tools: self.completion_tools,
        }
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_completion_tool(&self, name: &str) -> bool {
        self.completion_tools.contains(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// JSON-schema tool descriptors for the `tools` field of the chat
    /// completion request (§6).
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let tool = &self.tools[name];
                ToolDescriptor {
                    kind: "function",
                    function: FunctionDescriptor {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        parameters: tool.parameters_schema(),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ArgSpec;
    use crate::tool::ToolRunError;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn args(&self) -> &[ArgSpec] {
            &[]
        }
        async fn run(&self, args: Value) -> Result<Value, ToolRunError> {
            Ok(args)
        }
    }

    struct Done;

    #[async_trait]
    impl Tool for Done {
        fn name(&self) -> &str {
            "mark_generation_complete"
        }
        fn description(&self) -> &str {
            "signals completion"
        }
        fn args(&self) -> &[ArgSpec] {
            &[]
        }
        async fn run(&self, _args: Value) -> Result<Value, ToolRunError> {
            Ok(json!({"message": "done"}))
        }
    }

    #[test]
    fn builder_registers_and_flags_completion_tool() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(Echo))
            .register(Arc::new(Done))
            .completion_tool("mark_generation_complete")
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));
        assert!(registry.is_completion_tool("mark_generation_complete"));
        assert!(!registry.is_completion_tool("echo"));
    }

    #[test]
    fn descriptors_are_sorted_and_well_formed() {
        let registry = ToolRegistry::builder()
            .register(Arc::new(Echo))
            .register(Arc::new(Done))
            .build();
        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].function.name, "echo");
        assert_eq!(descriptors[0].kind, "function");
    }
}
