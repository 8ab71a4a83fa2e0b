//! Tool definition contract, argument schemas, and registry (§4.1, §4.2, §6).

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::{FunctionDescriptor, ToolDescriptor, ToolRegistry, ToolRegistryBuilder};
pub use schema::{json_schema, resolve_arg_resources, ArgKind, ArgSpec};
pub use tool::{Tool, ToolOutcome, ToolRunError};
