//! Unified configuration layer.
//!
//! Business code reads structured config via `from_env()`, not raw
//! `std::env::var` calls.
//!
//! - `loader`: env_or / env_optional / env_bool helpers
//! - `schema`: LlmConfig, DriverConfig, GovernorConfig, ObservabilityConfig
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv};
pub use schema::{DriverConfig, GovernorConfig, LlmConfig, ObservabilityConfig};
