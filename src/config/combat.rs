//! Combat engine configuration.

use serde::Deserialize;

use super::defaults::{default_combat_idle_cleanup_seconds, default_combat_turn_timeout_seconds};

/// Configuration for the combat engine (C8).
#[derive(Debug, Clone, Deserialize)]
pub struct CombatConfig {
    /// How long a turn-holder has before the engine auto-advances.
    #[serde(default = "default_combat_turn_timeout_seconds")]
    pub turn_timeout_seconds: u64,
    /// How long a combat may sit idle before `cleanup_stale_combats` ends it.
    #[serde(default = "default_combat_idle_cleanup_seconds")]
    pub idle_cleanup_seconds: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            turn_timeout_seconds: default_combat_turn_timeout_seconds(),
            idle_cleanup_seconds: default_combat_idle_cleanup_seconds(),
        }
    }
}
