//! Illustrative `Tool` implementations: real file-system read/write, plus
//! stubs for the sandbox, blueprint, and git-commit resource classes the
//! external collaborators own. These exist for scheduler/driver integration
//! tests exercising real resource conflicts, not as production handlers.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use agentrt_tools::{ArgKind, ArgSpec, Tool, ToolRunError};
use async_trait::async_trait;
use serde_json::{json, Value};

fn resolve(workspace: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        workspace.join(candidate)
    }
}

pub struct ReadFileTool {
    workspace: PathBuf,
    args: Vec<ArgSpec>,
}

impl ReadFileTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            args: vec![ArgSpec::new("path", "file path to read", ArgKind::FileReadPath)],
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "Read the UTF-8 contents of a file."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let path = parsed_args["path"]
            .as_str()
            .ok_or_else(|| ToolRunError::Failed("path must be a string".to_string()))?;
        let full = resolve(&self.workspace, path);
        let contents = tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| ToolRunError::Failed(format!("reading {}: {e}", full.display())))?;
        Ok(json!({ "contents": contents }))
    }
}

pub struct WriteFileTool {
    workspace: PathBuf,
    args: Vec<ArgSpec>,
}

impl WriteFileTool {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            args: vec![
                ArgSpec::new("path", "file path to write", ArgKind::FileWritePath),
                ArgSpec::new("content", "content to write", ArgKind::String),
            ],
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }
    fn description(&self) -> &str {
        "Write content to a file, creating parent directories as needed."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let path = parsed_args["path"]
            .as_str()
            .ok_or_else(|| ToolRunError::Failed("path must be a string".to_string()))?;
        let content = parsed_args["content"].as_str().unwrap_or_default();
        let full = resolve(&self.workspace, path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolRunError::Failed(format!("creating {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&full, content)
            .await
            .map_err(|e| ToolRunError::Failed(format!("writing {}: {e}", full.display())))?;
        Ok(json!({ "wrote": path, "bytes": content.len() }))
    }
}

/// Sandbox exclusivity stub. The real sandbox container is an external
/// collaborator; this records a fake "job id" so integration tests can
/// assert on wave serialization without spinning up a container.
pub struct SandboxExecTool {
    args: Vec<ArgSpec>,
    jobs: Mutex<Vec<String>>,
}

impl SandboxExecTool {
    pub fn new() -> Self {
        Self {
            args: vec![ArgSpec::new("command", "shell command to run in the sandbox", ArgKind::SandboxExec)],
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs_run(&self) -> Vec<String> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Default for SandboxExecTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SandboxExecTool {
    fn name(&self) -> &str {
        "sandbox_exec"
    }
    fn description(&self) -> &str {
        "Run a shell command in the project sandbox."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let command = parsed_args["command"].as_str().unwrap_or_default().to_string();
        self.jobs.lock().unwrap().push(command.clone());
        Ok(json!({ "ran": command, "exitCode": 0 }))
    }
}

/// Blueprint single-writer stub.
pub struct BlueprintEditTool {
    args: Vec<ArgSpec>,
}

impl BlueprintEditTool {
    pub fn new() -> Self {
        Self {
            args: vec![ArgSpec::new("patch", "blueprint edit to apply", ArgKind::Blueprint)],
        }
    }
}

impl Default for BlueprintEditTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for BlueprintEditTool {
    fn name(&self) -> &str {
        "edit_blueprint"
    }
    fn description(&self) -> &str {
        "Apply a patch to the shared blueprint document."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let patch = parsed_args["patch"].as_str().unwrap_or_default();
        Ok(json!({ "applied": patch }))
    }
}

/// Git-commit serialization stub.
pub struct GitCommitTool {
    args: Vec<ArgSpec>,
}

impl GitCommitTool {
    pub fn new() -> Self {
        Self {
            args: vec![ArgSpec::new("message", "commit message", ArgKind::GitCommit)],
        }
    }
}

impl Default for GitCommitTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GitCommitTool {
    fn name(&self) -> &str {
        "git_commit"
    }
    fn description(&self) -> &str {
        "Commit the current working tree."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let message = parsed_args["message"].as_str().unwrap_or_default();
        Ok(json!({ "committed": message, "sha": "deadbeef" }))
    }
}

/// A configurable completion-signal tool for tests: its `message` argument
/// becomes the result's `message` field, which the completion detector
/// lifts into the returned summary.
pub struct MarkCompleteTool {
    name: String,
    args: Vec<ArgSpec>,
}

impl MarkCompleteTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: vec![
                ArgSpec::optional("message", "completion summary", ArgKind::String, json!("")),
                ArgSpec::optional("filesGenerated", "count of files produced", ArgKind::Number, json!(0)),
            ],
        }
    }
}

#[async_trait]
impl Tool for MarkCompleteTool {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        "Signal that generation is complete."
    }
    fn args(&self) -> &[ArgSpec] {
        &self.args
    }
    async fn run(&self, parsed_args: Value) -> Result<Value, ToolRunError> {
        let message = parsed_args["message"].as_str().unwrap_or_default();
        let files_generated = parsed_args["filesGenerated"].as_u64().unwrap_or(0);
        Ok(json!({ "message": message, "filesGenerated": files_generated }))
    }
}
