//! Authentication gate configuration.

use serde::Deserialize;

use super::defaults::{
    default_auth_rate_limit_attempts, default_auth_rate_limit_window_seconds,
    default_auth_token_lifetime_seconds,
};

/// Configuration for the authentication gate (C11).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_token_lifetime_seconds")]
    pub token_lifetime_seconds: u64,
    /// HMAC signing secret for session tokens. Generated ephemerally with a
    /// startup warning when unset, matching the teacher's cloak-secret
    /// fallback; set explicitly for a production deployment so tokens
    /// survive a restart.
    pub token_secret: Option<String>,
    /// Maximum token-validation attempts per source within the window.
    #[serde(default = "default_auth_rate_limit_attempts")]
    pub rate_limit_attempts: u32,
    #[serde(default = "default_auth_rate_limit_window_seconds")]
    pub rate_limit_window_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_seconds: default_auth_token_lifetime_seconds(),
            token_secret: None,
            rate_limit_attempts: default_auth_rate_limit_attempts(),
            rate_limit_window_seconds: default_auth_rate_limit_window_seconds(),
        }
    }
}
