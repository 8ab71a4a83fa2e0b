//! Rate-limit provider contract (§4.4 guard 3, §6).
//!
//! The runtime consumes this as an external collaborator — it does not
//! define quota storage or windowing policy, only the check it performs
//! before every LLM call.

use crate::error::CoreError;

/// Per-user, per-model LLM call quota.
pub trait RateLimiter: Send + Sync {
    /// Returns `Err(CoreError::RateLimitExceeded)` if `user_id` has exhausted
    /// its quota for `model`; otherwise records the call and returns `Ok(())`.
    fn check_and_record(&self, user_id: &str, model: &str) -> Result<(), CoreError>;
}

/// A rate limiter that never throttles. Useful for tests and single-user
/// deployments where quota enforcement happens upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_and_record(&self, _user_id: &str, _model: &str) -> Result<(), CoreError> {
        Ok(())
    }
}
