//! Agentic Inference Runtime: shared configuration, error taxonomy,
//! credential/rate-limit contracts, and observability init.
//!
//! This crate has no knowledge of messages, tools, or the inference loop —
//! those live in `agentrt-driver`, `agentrt-tools`, and friends. It is the
//! ambient layer every other crate in the workspace depends on.

pub mod config;
pub mod credentials;
pub mod error;
pub mod observability;
pub mod rate_limit;

pub use config::{DriverConfig, GovernorConfig, LlmConfig, ObservabilityConfig};
pub use credentials::{CredentialProvider, EnvCredentialProvider, ResolvedCredentials};
pub use error::CoreError;
pub use rate_limit::{NoopRateLimiter, RateLimiter};
