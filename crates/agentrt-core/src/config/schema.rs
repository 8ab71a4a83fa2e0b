//! Domain-grouped configuration structs, loaded from the environment with
//! unified fallback/alias handling.

use super::env_keys::{driver, governors, llm, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or, env_u64, env_usize};

/// LLM API configuration (endpoint, credentials, default model).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// Optional AI-gateway base URL that fronts the real endpoint.
    pub ai_gateway_base: Option<String>,
    pub ai_gateway_token: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            api_base: env_or(llm::API_BASE, llm::API_BASE_ALIASES, || {
                "https://api.openai.com/v1".to_string()
            }),
            api_key: env_or(llm::API_KEY, llm::API_KEY_ALIASES, String::new),
            model: env_or(llm::MODEL, llm::MODEL_ALIASES, || "gpt-4o".to_string()),
            ai_gateway_base: env_optional(llm::AI_GATEWAY_BASE, &[]),
            ai_gateway_token: env_optional(llm::AI_GATEWAY_TOKEN, &[]),
        }
    }
}

/// §6/§4.4 driver knobs: message cap, stream chunk size, default recursion depth.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Upper bound on conversation length per inference call (§4.4 guard 1).
    pub max_llm_messages: usize,
    /// Bytes the streaming text accumulator grows by before flushing to the sink.
    pub stream_chunk_size: usize,
    /// Fallback recursion cap when an action key has no specific `maxDepth`.
    pub default_max_depth: u32,
}

impl DriverConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            max_llm_messages: env_usize(driver::MAX_LLM_MESSAGES, 200),
            stream_chunk_size: env_usize(driver::STREAM_CHUNK_SIZE, 64),
            default_max_depth: env_usize(driver::DEFAULT_MAX_DEPTH, 25) as u32,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_llm_messages: 200,
            stream_chunk_size: 64,
            default_max_depth: 25,
        }
    }
}

/// §4.5 governor knobs: repetition windows and thresholds.
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Sliding window for the tool-repetition detector, in seconds (default 120s = 2min).
    pub tool_repetition_window_secs: u64,
    /// Number of prior identical calls required to trigger a warning (§8 I8: "third+").
    pub tool_repetition_threshold: usize,
    /// Max records retained in the tool-repetition FIFO.
    pub tool_repetition_capacity: usize,
    /// Characters appended before the text-repetition probe re-runs.
    pub text_repetition_check_interval: usize,
    /// Trailing window, in characters, the text-repetition probe inspects.
    pub text_repetition_window: usize,
}

impl GovernorConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            tool_repetition_window_secs: env_u64(governors::TOOL_REPETITION_WINDOW_SECS, 120),
            tool_repetition_threshold: env_usize(governors::TOOL_REPETITION_THRESHOLD, 2),
            tool_repetition_capacity: env_usize(governors::TOOL_REPETITION_CAPACITY, 1000),
            text_repetition_check_interval: env_usize(
                governors::TEXT_REPETITION_CHECK_INTERVAL,
                50,
            ),
            text_repetition_window: env_usize(governors::TEXT_REPETITION_WINDOW, 4000),
        }
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            tool_repetition_window_secs: 120,
            tool_repetition_threshold: 2,
            tool_repetition_capacity: 1000,
            text_repetition_check_interval: 50,
            text_repetition_window: 4000,
        }
    }
}

/// Observability configuration: quiet mode, log level, JSON logs.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            quiet: env_bool(obv_keys::QUIET, &[], false),
            log_level: env_or(obv_keys::LOG_LEVEL, obv_keys::LOG_LEVEL_ALIASES, || {
                "agentrt=info".to_string()
            }),
            log_json: env_bool(obv_keys::LOG_JSON, &[], false),
        }
    }
}
