//! Credential resolution for LLM providers, including BYOK overrides (§6).

use crate::config::LlmConfig;

/// A resolved endpoint + credential pair for one model invocation.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub api_base: String,
    pub api_key: String,
}

/// Per-user credential overrides ("bring your own key"). The platform default
/// (`LlmConfig::from_env`) is used whenever a provider returns `None`.
pub trait CredentialProvider: Send + Sync {
    /// Look up a BYOK override for `user_id` + `model`. `None` means fall
    /// back to the platform default.
    fn byok_override(&self, user_id: &str, model: &str) -> Option<ResolvedCredentials>;
}

/// Default provider: no per-user overrides, always falls back to env config.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialProvider;

impl CredentialProvider for EnvCredentialProvider {
    fn byok_override(&self, _user_id: &str, _model: &str) -> Option<ResolvedCredentials> {
        None
    }
}

/// Resolve credentials for a call: BYOK override first, then the platform
/// default loaded from the environment (optionally routed through an
/// AI-gateway base URL per §6).
pub fn resolve_credentials(
    provider: &dyn CredentialProvider,
    user_id: &str,
    model: &str,
    platform: &LlmConfig,
) -> ResolvedCredentials {
    if let Some(byok) = provider.byok_override(user_id, model) {
        return byok;
    }
    let api_base = platform
        .ai_gateway_base
        .clone()
        .unwrap_or_else(|| platform.api_base.clone());
    let api_key = platform
        .ai_gateway_token
        .clone()
        .unwrap_or_else(|| platform.api_key.clone());
    ResolvedCredentials { api_base, api_key }
}
