//! Tagged argument schemas (§9 "Duck-typed tool arguments → tagged schemas").
//!
//! Each `ArgKind` variant closes over what the corresponding Python/TS
//! "argument type" in the original design carried loosely: a JSON-schema
//! fragment and a resource contribution rule. `resolve()` pattern-matches
//! over the closed set so resource resolution is mechanical rather than
//! tool-specific.

use agentrt_resources::{FileAccess, FileMode, Resources, SandboxOp};
use serde_json::{json, Value};

/// The closed set of semantic argument types a tool's parameters are built
/// from. Compound kinds (`ArrayOf`, `OptionalOf`) recurse into an inner kind.
#[derive(Debug, Clone)]
pub enum ArgKind {
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
    /// A relative or absolute file path the tool reads.
    FileReadPath,
    /// A relative or absolute file path the tool writes (or "" for "all files").
    FileWritePath,
    /// A sandbox operation token; which op it resolves to is fixed per-kind.
    SandboxExec,
    SandboxAnalysis,
    SandboxDeploy,
    SandboxRead,
    /// Touches the shared blueprint document.
    Blueprint,
    /// Performs a git commit.
    GitCommit,
    ArrayOf(Box<ArgKind>),
    OptionalOf(Box<ArgKind>),
}

/// One named argument in a tool's schema.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub description: String,
    pub kind: ArgKind,
    /// Required fields are those whose kind is not `OptionalOf` (§6).
    pub required: bool,
    pub default: Option<Value>,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: ArgKind) -> Self {
        let required = !matches!(kind, ArgKind::OptionalOf(_));
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>, inner: ArgKind, default: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: ArgKind::OptionalOf(Box::new(inner)),
            required: false,
            default: Some(default),
        }
    }
}

/// Build the `parameters` JSON schema fragment for a tool (§6 Tool descriptor).
pub fn json_schema(args: &[ArgSpec]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();
    for arg in args {
        properties.insert(arg.name.clone(), arg_schema_fragment(arg));
        if arg.required {
            required.push(Value::String(arg.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

fn arg_schema_fragment(arg: &ArgSpec) -> Value {
    let mut fragment = kind_schema_fragment(&arg.kind);
    if let Value::Object(ref mut map) = fragment {
        map.insert("description".to_string(), Value::String(arg.description.clone()));
        if let Some(default) = &arg.default {
            map.insert("default".to_string(), default.clone());
        }
    }
    fragment
}

fn kind_schema_fragment(kind: &ArgKind) -> Value {
    match kind {
        ArgKind::String
        | ArgKind::FileReadPath
        | ArgKind::FileWritePath
        | ArgKind::SandboxExec
        | ArgKind::SandboxAnalysis
        | ArgKind::SandboxDeploy
        | ArgKind::SandboxRead
        | ArgKind::Blueprint
        | ArgKind::GitCommit => json!({ "type": "string" }),
        ArgKind::Number => json!({ "type": "number" }),
        ArgKind::Boolean => json!({ "type": "boolean" }),
        ArgKind::Enum(values) => json!({ "type": "string", "enum": values }),
        ArgKind::ArrayOf(inner) => json!({
            "type": "array",
            "items": kind_schema_fragment(inner),
        }),
        ArgKind::OptionalOf(inner) => kind_schema_fragment(inner),
    }
}

/// Mechanically resolve the `Resources` footprint a single argument value
/// contributes, given its declared `ArgKind`. Tools that need more than one
/// argument union the per-argument results (see `ToolDefinition::resolve_resources`).
pub fn resolve_arg_resources(kind: &ArgKind, value: &Value) -> Resources {
    match kind {
        ArgKind::FileReadPath => path_strings(value)
            .map(|paths| Resources::files(FileAccess::read(paths)))
            .unwrap_or_default(),
        ArgKind::FileWritePath => path_strings(value)
            .map(|paths| {
                if paths.is_empty() {
                    Resources::files(FileAccess::all(FileMode::Write))
                } else {
                    Resources::files(FileAccess::write(paths))
                }
            })
            .unwrap_or_default(),
        ArgKind::SandboxExec => Resources::sandbox(SandboxOp::Exec),
        ArgKind::SandboxAnalysis => Resources::sandbox(SandboxOp::Analysis),
        ArgKind::SandboxDeploy => Resources::sandbox(SandboxOp::Deploy),
        ArgKind::SandboxRead => Resources::sandbox(SandboxOp::Read),
        ArgKind::Blueprint => Resources::blueprint(),
        ArgKind::GitCommit => Resources::git_commit(),
        ArgKind::ArrayOf(inner) => value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| resolve_arg_resources(inner, item))
                    .fold(Resources::none(), |acc, r| acc.merge(&r))
            })
            .unwrap_or_default(),
        ArgKind::OptionalOf(inner) => {
            if value.is_null() {
                Resources::none()
            } else {
                resolve_arg_resources(inner, value)
            }
        }
        ArgKind::String | ArgKind::Number | ArgKind::Boolean | ArgKind::Enum(_) => Resources::none(),
    }
}

fn path_strings(value: &Value) -> Option<Vec<String>> {
    if let Some(s) = value.as_str() {
        return Some(vec![s.to_string()]);
    }
    if let Some(arr) = value.as_array() {
        return Some(arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_flag_follows_optional_of() {
        let required = ArgSpec::new("path", "desc", ArgKind::FileReadPath);
        assert!(required.required);
        let opt = ArgSpec::optional("dry_run", "desc", ArgKind::Boolean, json!(false));
        assert!(!opt.required);
    }

    #[test]
    fn json_schema_lists_required_fields() {
        let args = vec![
            ArgSpec::new("path", "file path", ArgKind::FileWritePath),
            ArgSpec::optional("append", "append mode", ArgKind::Boolean, json!(false)),
        ];
        let schema = json_schema(&args);
        assert_eq!(schema["required"], json!(["path"]));
        assert_eq!(schema["properties"]["append"]["default"], json!(false));
    }

    #[test]
    fn file_read_path_resolves_to_read_resources() {
        let res = resolve_arg_resources(&ArgKind::FileReadPath, &json!("src/lib.rs"));
        let files = res.files.unwrap();
        assert_eq!(files.mode, FileMode::Read);
        assert!(files.paths.contains("src/lib.rs"));
    }

    #[test]
    fn array_of_file_write_paths_unions() {
        let kind = ArgKind::ArrayOf(Box::new(ArgKind::FileWritePath));
        let res = resolve_arg_resources(&kind, &json!(["a.rs", "b.rs"]));
        let files = res.files.unwrap();
        assert_eq!(files.mode, FileMode::Write);
        assert!(files.paths.contains("a.rs") && files.paths.contains("b.rs"));
    }

    #[test]
    fn empty_write_path_array_means_all_files() {
        let kind = ArgKind::FileWritePath;
        let res = resolve_arg_resources(&kind, &json!([]));
        assert!(res.files.unwrap().is_all());
    }

    #[test]
    fn optional_of_null_contributes_no_resources() {
        let kind = ArgKind::OptionalOf(Box::new(ArgKind::FileWritePath));
        let res = resolve_arg_resources(&kind, &Value::Null);
        assert_eq!(res, Resources::none());
    }
}
