//! Prometheus metrics collection for the core.
//!
//! Tracks command throughput/errors, subject registry activity, connection
//! and combat population, and pending-queue backpressure. Exposed on an HTTP
//! endpoint by [`crate::http`].

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder};

lazy_static! {
    /// Global Prometheus registry for all metrics.
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total commands dispatched, by verb.
    pub static ref COMMANDS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new("core_commands_total", "Total commands dispatched"),
        &["command"],
    ).unwrap();

    /// Total command errors, by verb and error kind.
    pub static ref COMMAND_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new("core_command_errors_total", "Total command errors"),
        &["command", "error_kind"],
    ).unwrap();

    /// Command handler latency, by verb.
    pub static ref COMMAND_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new("core_command_duration_seconds", "Command handler latency"),
        &["command"],
    ).unwrap();

    /// Subject builds, validations, and cache hits.
    pub static ref SUBJECT_BUILDS_TOTAL: IntCounter = IntCounter::new(
        "core_subject_builds_total", "Total subject builds"
    ).unwrap();
    pub static ref SUBJECT_VALIDATIONS_TOTAL: IntCounter = IntCounter::new(
        "core_subject_validations_total", "Total subject validations"
    ).unwrap();
    pub static ref SUBJECT_CACHE_HITS_TOTAL: IntCounter = IntCounter::new(
        "core_subject_cache_hits_total", "Subject validation cache hits"
    ).unwrap();
    pub static ref SUBJECT_ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new("core_subject_errors_total", "Subject errors by category"),
        &["error_kind"],
    ).unwrap();

    /// Currently active player sessions.
    pub static ref ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "core_active_sessions", "Currently active player sessions"
    ).unwrap();

    /// Players currently in grace period.
    pub static ref GRACE_PERIOD_PLAYERS: IntGauge = IntGauge::new(
        "core_grace_period_players", "Players currently in grace period"
    ).unwrap();

    /// Currently active combat instances.
    pub static ref ACTIVE_COMBATS: IntGauge = IntGauge::new(
        "core_active_combats", "Currently active combat instances"
    ).unwrap();

    /// Pending-queue entries dropped due to overflow.
    pub static ref PENDING_QUEUE_DROPPED_TOTAL: IntCounter = IntCounter::new(
        "core_pending_queue_dropped_total", "Pending-queue entries dropped on overflow"
    ).unwrap();
}

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    REGISTRY.register(Box::new(COMMANDS_TOTAL.clone())).unwrap();
    REGISTRY
        .register(Box::new(COMMAND_ERRORS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(COMMAND_DURATION_SECONDS.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(SUBJECT_BUILDS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(SUBJECT_VALIDATIONS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(SUBJECT_CACHE_HITS_TOTAL.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(SUBJECT_ERRORS_TOTAL.clone()))
        .unwrap();
    REGISTRY.register(Box::new(ACTIVE_SESSIONS.clone())).unwrap();
    REGISTRY
        .register(Box::new(GRACE_PERIOD_PLAYERS.clone()))
        .unwrap();
    REGISTRY.register(Box::new(ACTIVE_COMBATS.clone())).unwrap();
    REGISTRY
        .register(Box::new(PENDING_QUEUE_DROPPED_TOTAL.clone()))
        .unwrap();
}

/// Record a successfully dispatched command and its latency.
pub fn record_command(command: &str, duration_secs: f64) {
    COMMANDS_TOTAL.with_label_values(&[command]).inc();
    COMMAND_DURATION_SECONDS
        .with_label_values(&[command])
        .observe(duration_secs);
}

/// Record a command dispatch error.
pub fn record_command_error(command: &str, error_kind: &str) {
    COMMAND_ERRORS_TOTAL
        .with_label_values(&[command, error_kind])
        .inc();
}

/// Record a subject registry error by category.
pub fn record_subject_error(error_kind: &str) {
    SUBJECT_ERRORS_TOTAL.with_label_values(&[error_kind]).inc();
}

/// Gather all metrics and encode them in Prometheus text format.
///
/// Returns a string suitable for HTTP response on the `/metrics` endpoint.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
