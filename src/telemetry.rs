//! Command-aware telemetry: structured tracing spans carrying player/room
//! context, correlated with the metrics in [`crate::metrics`].

use std::time::Instant;
use tracing::{Level, Span, span};

/// Per-command trace context: the fields attached to every dispatch span.
#[derive(Debug, Clone, Default)]
pub struct CommandTraceContext {
    pub command: Option<String>,
    pub player_id: Option<String>,
    pub room_id: Option<String>,
    pub session_id: Option<String>,
}

impl CommandTraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_player_id(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    pub fn with_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn into_span(self) -> Span {
        let command = self.command.as_deref().unwrap_or("unknown");
        span!(
            Level::INFO,
            "command",
            command = command,
            player_id = self.player_id.as_deref(),
            room_id = self.room_id.as_deref(),
            session_id = self.session_id.as_deref(),
        )
    }
}

/// Guard for timing command execution; records latency into
/// [`crate::metrics::COMMAND_DURATION_SECONDS`] on drop.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and record an error without recording latency.
    pub fn record_error(self, error_kind: &str) {
        crate::metrics::record_command_error(&self.command, error_kind);
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Initialise the global `tracing` subscriber from telemetry config.
pub fn init_tracing(config: &crate::config::TelemetryConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_json() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
