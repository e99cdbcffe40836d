//! Command pipeline configuration.

use serde::Deserialize;

use super::defaults::default_command_max_length;

/// Configuration for the command pipeline (C5).
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    #[serde(default = "default_command_max_length")]
    pub max_length: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            max_length: default_command_max_length(),
        }
    }
}
