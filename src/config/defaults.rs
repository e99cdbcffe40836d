//! Default value functions for configuration.
//!
//! Separated into its own module so every sub-config can reference a named
//! function in `#[serde(default = "...")]` rather than repeating literals.

pub fn default_true() -> bool {
    true
}

pub fn default_subject_max_length() -> usize {
    255
}

pub fn default_connection_rate_limit_attempts() -> u32 {
    5
}

pub fn default_connection_rate_limit_window_seconds() -> u64 {
    60
}

pub fn default_grace_timeout_seconds() -> u64 {
    90
}

pub fn default_pending_queue_capacity() -> usize {
    200
}

pub fn default_combat_turn_timeout_seconds() -> u64 {
    30
}

pub fn default_combat_idle_cleanup_seconds() -> u64 {
    1800
}

pub fn default_command_max_length() -> usize {
    50
}

pub fn default_auth_token_lifetime_seconds() -> u64 {
    3600
}

pub fn default_auth_rate_limit_attempts() -> u32 {
    10
}

pub fn default_auth_rate_limit_window_seconds() -> u64 {
    60
}

pub fn default_telemetry_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}
