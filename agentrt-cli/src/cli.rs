use clap::Parser;

/// Agentic Inference Runtime demo harness: run one operation end-to-end
/// against an OpenAI-compatible endpoint, streaming assistant text to stdout.
#[derive(Parser, Debug)]
#[command(name = "agentrt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub api_key: Option<String>,

    /// Model name (e.g. gpt-4o, claude-3-5-sonnet-20241022)
    #[arg(long, short, env = "AGENTRT_MODEL")]
    pub model: Option<String>,

    /// Workspace directory the demo file tools read/write under
    #[arg(long, short, default_value = ".")]
    pub workspace: String,

    /// System message
    #[arg(long, default_value = "You are a careful coding assistant.")]
    pub system: String,

    /// User message to send
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Action key selecting the recursion-depth cap (falls back to the
    /// driver's default_max_depth when not one of the known keys)
    #[arg(long, default_value = "default")]
    pub action_key: String,

    /// Override the recursion-depth cap for this run
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Emit logs as JSON instead of the default human-readable format
    #[arg(long)]
    pub log_json: bool,

    /// Suppress info-level logs
    #[arg(long)]
    pub quiet: bool,
}
