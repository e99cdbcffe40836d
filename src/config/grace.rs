//! Login grace-period configuration.

use serde::Deserialize;

use super::defaults::default_grace_timeout_seconds;

/// Configuration for the grace period a disconnected player is held in
/// before presence is removed.
#[derive(Debug, Clone, Deserialize)]
pub struct GraceConfig {
    #[serde(default = "default_grace_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GraceConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_grace_timeout_seconds(),
        }
    }
}
