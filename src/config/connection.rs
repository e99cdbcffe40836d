//! Connection manager configuration.

use serde::Deserialize;

use super::defaults::{
    default_connection_rate_limit_attempts, default_connection_rate_limit_window_seconds,
};

/// Configuration for the connection manager (C3)'s rate limiting.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Maximum connection attempts per player within the window.
    #[serde(default = "default_connection_rate_limit_attempts")]
    pub rate_limit_attempts: u32,
    /// Width of the sliding window, in seconds.
    #[serde(default = "default_connection_rate_limit_window_seconds")]
    pub rate_limit_window_seconds: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            rate_limit_attempts: default_connection_rate_limit_attempts(),
            rate_limit_window_seconds: default_connection_rate_limit_window_seconds(),
        }
    }
}
