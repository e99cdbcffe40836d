//! hearthcored - Hearthcore MUD game server core
//!
//! Wires the subject registry, connection manager, combat engine, and
//! authentication gate together, then runs the command pipeline and HTTP
//! surface until shutdown.

mod auth;
mod broker;
mod combat;
mod command;
mod config;
mod connection;
mod domain;
mod error;
mod follow;
mod http;
mod look;
mod memstore;
mod metrics;
mod persistence;
mod presence;
mod security;
mod session;
mod spell;
mod subject;
mod target;
mod telemetry;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};

use crate::combat::CombatEngine;
use crate::command::{Registry as CommandRegistry, Services};
use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::follow::FollowCoordinator;
use crate::memstore::MemoryStore;
use crate::session::SessionLifecycle;
use crate::subject::SubjectRegistry;

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
/// Falls back to `config.toml` when no argument is provided.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);

    let raw_path = match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "hearthcore.toml".to_string(),
    };

    match std::fs::canonicalize(Path::new(&raw_path)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => raw_path,
    }
}

#[tokio::main]
async fn main() {
    let config_path = resolve_config_path();

    let config = match Config::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load config from {config_path} ({e}); using built-in defaults");
            Config::default()
        }
    };

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            eprintln!("config error: {err}");
        }
        std::process::exit(1);
    }

    telemetry::init_tracing(&config.telemetry);
    metrics::init();

    info!("starting hearthcore");

    let registry = Arc::new(SubjectRegistry::new(&config.subject));
    let broker = broker::MessageBroker::new(registry.clone(), None);

    let connections = Arc::new(ConnectionManager::new(
        broker.clone(),
        registry.clone(),
        &config.connection,
        &config.grace,
        &config.pending,
    ));

    let store = Arc::new(MemoryStore::seeded());
    let persistence: Arc<dyn persistence::Persistence> = store.clone();
    let npc_runtime: Arc<dyn persistence::NpcRuntime> = store.clone();
    let prototype_registry: Arc<dyn persistence::PrototypeRegistry> = store.clone();

    let combat = Arc::new(CombatEngine::new(
        broker.clone(),
        registry.clone(),
        persistence.clone(),
        prototype_registry.clone(),
        &config.combat,
        std::collections::HashMap::new(),
    ));

    let follow = Arc::new(FollowCoordinator::new());

    let auth = Arc::new(auth::AuthGate::new(&config.auth, persistence.clone()));
    let sessions = Arc::new(SessionLifecycle::new(
        connections.clone(),
        auth.clone(),
        persistence.clone(),
    ));

    let services = Services {
        persistence,
        npc_runtime,
        prototype_registry,
        connections: connections.clone(),
        broker,
        subjects: registry.clone(),
        combat: combat.clone(),
        follow,
    };

    let commands = Arc::new(CommandRegistry::new());
    let shutting_down = Arc::new(AtomicBool::new(false));
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let maintenance_handle =
        spawn_maintenance(connections.clone(), combat.clone(), shutdown_tx.subscribe());

    let app_state = http::AppState {
        subjects: registry,
        auth,
        sessions,
        commands,
        services,
        command_max_length: config.command.max_length,
        shutting_down: shutting_down.clone(),
    };

    let http_addr = config.telemetry.metrics_addr.clone();
    let http_handle = tokio::spawn(async move {
        http::run_http_server(&http_addr, app_state).await;
    });

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining");
    shutting_down.store(true, Ordering::Relaxed);
    let _ = shutdown_tx.send(());

    maintenance_handle.abort();
    http_handle.abort();

    info!("hearthcore stopped");
}

fn spawn_maintenance(
    connections: Arc<ConnectionManager>,
    combat: Arc<CombatEngine>,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(5));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = connections.cleanup_expired_grace().await {
                        warn!(error = %e, "grace period cleanup failed");
                    }
                    if let Err(e) = combat.cleanup_stale_combats().await {
                        warn!(error = %e, "stale combat cleanup failed");
                    }
                    if let Err(e) = combat.enforce_turn_timeouts().await {
                        warn!(error = %e, "combat turn timeout enforcement failed");
                    }

                    metrics::ACTIVE_SESSIONS.set(connections.active_session_count() as i64);
                    metrics::GRACE_PERIOD_PLAYERS.set(connections.grace_population() as i64);
                    metrics::ACTIVE_COMBATS.set(combat.active_combat_count() as i64);
                }
                _ = shutdown_rx.recv() => {
                    info!("maintenance loop stopping");
                    break;
                }
            }
        }
    })
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
