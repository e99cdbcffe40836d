//! Telemetry (logging + metrics surface) configuration.

use serde::Deserialize;

use super::defaults::{default_metrics_addr, default_telemetry_format};

/// Configuration for structured logging and the metrics/admin HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// `"pretty"` or `"json"`.
    #[serde(default = "default_telemetry_format")]
    pub log_format: String,
    /// Address the metrics/admin HTTP server binds to.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: default_telemetry_format(),
            metrics_addr: default_metrics_addr(),
        }
    }
}

impl TelemetryConfig {
    pub fn is_json(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
