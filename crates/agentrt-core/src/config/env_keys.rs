//! Environment variable key constants, grouped by domain.

pub mod llm {
    pub const API_BASE: &str = "AGENTRT_API_BASE";
    pub const API_BASE_ALIASES: &[&str] = &["OPENAI_API_BASE", "LLM_API_BASE"];
    pub const API_KEY: &str = "AGENTRT_API_KEY";
    pub const API_KEY_ALIASES: &[&str] = &["OPENAI_API_KEY", "LLM_API_KEY"];
    pub const MODEL: &str = "AGENTRT_MODEL";
    pub const MODEL_ALIASES: &[&str] = &["OPENAI_MODEL"];
    pub const AI_GATEWAY_BASE: &str = "AGENTRT_AI_GATEWAY_BASE";
    pub const AI_GATEWAY_TOKEN: &str = "AGENTRT_AI_GATEWAY_TOKEN";
}

pub mod driver {
    pub const MAX_LLM_MESSAGES: &str = "AGENTRT_MAX_LLM_MESSAGES";
    pub const STREAM_CHUNK_SIZE: &str = "AGENTRT_STREAM_CHUNK_SIZE";
    pub const DEFAULT_MAX_DEPTH: &str = "AGENTRT_DEFAULT_MAX_DEPTH";
}

pub mod governors {
    pub const TOOL_REPETITION_WINDOW_SECS: &str = "AGENTRT_TOOL_REPETITION_WINDOW_SECS";
    pub const TOOL_REPETITION_THRESHOLD: &str = "AGENTRT_TOOL_REPETITION_THRESHOLD";
    pub const TOOL_REPETITION_CAPACITY: &str = "AGENTRT_TOOL_REPETITION_CAPACITY";
    pub const TEXT_REPETITION_CHECK_INTERVAL: &str = "AGENTRT_TEXT_REPETITION_CHECK_INTERVAL";
    pub const TEXT_REPETITION_WINDOW: &str = "AGENTRT_TEXT_REPETITION_WINDOW";
}

pub mod observability {
    pub const QUIET: &str = "AGENTRT_QUIET";
    pub const LOG_LEVEL: &str = "AGENTRT_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["RUST_LOG"];
    pub const LOG_JSON: &str = "AGENTRT_LOG_JSON";
}
