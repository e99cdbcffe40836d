//! Pending-message queue configuration.

use serde::Deserialize;

use super::defaults::default_pending_queue_capacity;

/// Configuration for the per-player pending-message queue used while a
/// player is in grace period.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingConfig {
    #[serde(default = "default_pending_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_pending_queue_capacity(),
        }
    }
}
