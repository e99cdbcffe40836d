//! Root configuration struct.

use serde::Deserialize;

use super::auth::AuthConfig;
use super::combat::CombatConfig;
use super::command::CommandConfig;
use super::connection::ConnectionConfig;
use super::grace::GraceConfig;
use super::pending::PendingConfig;
use super::subject::SubjectConfig;
use super::telemetry::TelemetryConfig;

/// Top-level configuration tree, assembled from one sub-config per
/// component. A minimal (even empty) TOML document is valid: every field
/// either has a `#[serde(default)]` or the sub-config itself derives
/// `Default`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub subject: SubjectConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub grace: GraceConfig,
    #[serde(default)]
    pub pending: PendingConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Load configuration from a TOML file, falling back to built-in
    /// defaults for any key it omits.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;
        Ok(config)
    }
}
