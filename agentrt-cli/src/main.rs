mod cli;

use std::io::Write;
use std::sync::Arc;

use agentrt_core::config::{DriverConfig, GovernorConfig, LlmConfig, ObservabilityConfig};
use agentrt_core::credentials::{resolve_credentials, EnvCredentialProvider};
use agentrt_core::observability::init_tracing;
use agentrt_core::rate_limit::NoopRateLimiter;
use agentrt_demo_tools::{BlueprintEditTool, GitCommitTool, MarkCompleteTool, ReadFileTool, SandboxExecTool, WriteFileTool};
use agentrt_driver::{ChatMessage, InferenceOperation, InferenceRequest, LlmClient, SamplingParams};
use agentrt_tools::ToolRegistry;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::watch;

const COMPLETION_TOOL: &str = "mark_generation_complete";

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let mut observability = ObservabilityConfig::from_env();
    if args.log_json {
        observability.log_json = true;
    }
    if args.quiet {
        observability.quiet = true;
    }
    init_tracing(&observability);

    let rt = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;
    rt.block_on(run(args))
}

async fn run(args: cli::Cli) -> Result<()> {
    let mut llm_config = LlmConfig::from_env();
    if let Some(base) = args.api_base {
        llm_config.api_base = base;
    }
    if let Some(key) = args.api_key {
        llm_config.api_key = key;
    }
    if let Some(model) = args.model {
        llm_config.model = model;
    }

    let credentials = resolve_credentials(&EnvCredentialProvider, "cli-user", &llm_config.model, &llm_config);
    if credentials.api_key.is_empty() {
        bail!("API key required: set OPENAI_API_KEY or pass --api-key");
    }

    let driver_config = DriverConfig::from_env();
    let governor_config = GovernorConfig::from_env();
    let max_depth = args.max_depth.unwrap_or(driver_config.default_max_depth);

    let registry = Arc::new(
        ToolRegistry::builder()
            .register(Arc::new(ReadFileTool::new(args.workspace.as_str())))
            .register(Arc::new(WriteFileTool::new(args.workspace.as_str())))
            .register(Arc::new(SandboxExecTool::new()))
            .register(Arc::new(BlueprintEditTool::new()))
            .register(Arc::new(GitCommitTool::new()))
            .register(Arc::new(MarkCompleteTool::new(COMPLETION_TOOL)))
            .completion_tool(COMPLETION_TOOL)
            .build(),
    );

    let client = LlmClient::new(credentials.api_base, credentials.api_key);
    let mut operation = InferenceOperation::new(
        client,
        registry,
        Arc::new(NoopRateLimiter),
        [COMPLETION_TOOL],
        driver_config,
        governor_config,
    );

    let messages = vec![ChatMessage::system(args.system), ChatMessage::user(args.message)];
    let request = InferenceRequest {
        model: &llm_config.model,
        action_key: &args.action_key,
        user_id: "cli-user",
        sampling: SamplingParams::default(),
        max_depth,
        structured_output: None,
    };
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let stdout = std::io::stdout();
    let outcome = operation
        .run(messages, &request, &cancel_rx, move |chunk: &str| {
            let mut out = stdout.lock();
            let _ = out.write_all(chunk.as_bytes());
            let _ = out.flush();
        })
        .await;

    println!();
    match outcome {
        Ok(outcome) => {
            if let Some(signal) = outcome.completion {
                eprintln!(
                    "\n[completed via {} after {} step(s): {}]",
                    signal.tool_name,
                    outcome.context.depth,
                    signal.summary.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("\n[error: {e}]");
            Err(e.into())
        }
    }
}
