//! Connection manager (C3): owns live transport sessions, enforces
//! per-player session uniqueness, and hides transient disconnects behind a
//! grace period.
//!
//! The `DashMap` of `Arc<RwLock<T>>` shape and the "collect candidates
//! first, then act, to avoid holding locks during removal" idiom for
//! maintenance sweeps are grounded on the teacher's `state/managers/client.rs`
//! `ClientManager`.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::broker::MessageBroker;
use crate::error::{CoreError, ExternalError, PolicyError};
use crate::security::ConnectionRateLimiter;
use crate::subject::SubjectRegistry;

use super::types::{
    DisconnectReason, EvictionOutcome, GraceRecord, PendingQueue, Session, Transport,
};

pub struct ConnectionManager {
    sessions: DashMap<String, Arc<RwLock<Session>>>,
    player_sessions: DashMap<String, String>,
    grace: DashMap<String, GraceRecord>,
    pending: DashMap<String, PendingQueue>,
    broker: Arc<MessageBroker>,
    registry: Arc<SubjectRegistry>,
    rate_limiter: ConnectionRateLimiter,
    grace_timeout_seconds: i64,
    pending_capacity: usize,
}

impl ConnectionManager {
    pub fn new(
        broker: Arc<MessageBroker>,
        registry: Arc<SubjectRegistry>,
        connection_config: &crate::config::ConnectionConfig,
        grace_config: &crate::config::GraceConfig,
        pending_config: &crate::config::PendingConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            player_sessions: DashMap::new(),
            grace: DashMap::new(),
            pending: DashMap::new(),
            broker,
            registry,
            rate_limiter: ConnectionRateLimiter::new(connection_config),
            grace_timeout_seconds: grace_config.timeout_seconds as i64,
            pending_capacity: pending_config.queue_capacity,
        }
    }

    /// Subscribe a new session to its room's events and the global
    /// subjects, evicting any prior session for the player first.
    pub async fn connect(
        &self,
        transport: Arc<dyn Transport>,
        player_id: &str,
        room_id: &str,
    ) -> Result<String, CoreError> {
        if !self.rate_limiter.check(player_id) {
            return Err(PolicyError::RateLimited.into());
        }

        let was_in_grace = self.grace.remove(player_id).is_some();
        let pending = self
            .pending
            .remove(player_id)
            .map(|(_, mut q)| q.drain_in_order())
            .unwrap_or_default();

        self.handle_new_game_session(player_id, "").await;

        let session_id = Uuid::new_v4().to_string();

        // One closure shape, reused for every subject this session cares
        // about: deliver unless the envelope was published excluding this
        // player. `events.game_tick` is the one global broadcast with no
        // exclusion semantics.
        let broker = self.broker.clone();
        let subscribe_self = |pattern: String| {
            let transport = transport.clone();
            let player_id = player_id.to_string();
            broker.subscribe(pattern, move |envelope| {
                if envelope.exclude_player_id.as_deref() != Some(player_id.as_str()) {
                    transport.send(envelope);
                }
            })
        };

        let subscriptions = vec![
            subscribe_self(format!("events.*.{room_id}")),
            subscribe_self("chat.global".to_string()),
            subscribe_self("chat.system".to_string()),
            self.broker.subscribe("events.game_tick", {
                let transport = transport.clone();
                move |envelope| transport.send(envelope)
            }),
            // Room-scoped say/emote/pose share the `chat.<verb>.room.{room_id}`
            // shape, so one wildcard subscription covers all three.
            subscribe_self(format!("chat.*.room.{room_id}")),
            subscribe_self(format!("chat.whisper.player.{player_id}")),
            // No party/subzone membership is tracked yet, so these stay
            // broad rather than silently receiving nothing.
            subscribe_self("chat.party.group.*".to_string()),
            subscribe_self("chat.local.subzone.*".to_string()),
            // Room-scoped combat events (attack/started/ended/npc_died/
            // damage/turn/timeout/npc_attacked/npc_action) share the
            // `combat.<verb>.{room_id}` shape.
            subscribe_self(format!("combat.*.{room_id}")),
            subscribe_self(format!("combat.dp_update.{player_id}")),
        ];

        for envelope in &pending {
            transport.send(envelope);
        }
        if was_in_grace {
            info!(player_id, "grace period cleared on reconnect");
        }

        let session = Session {
            id: session_id.clone(),
            player_id: player_id.to_string(),
            room_id: room_id.to_string(),
            transport,
            subscriptions,
            connected_at: Utc::now(),
        };

        self.sessions
            .insert(session_id.clone(), Arc::new(RwLock::new(session)));
        self.player_sessions
            .insert(player_id.to_string(), session_id.clone());

        Ok(session_id)
    }

    pub async fn disconnect(&self, session_id: &str, reason: DisconnectReason) {
        let Some((_, session)) = self.sessions.remove(session_id) else {
            return;
        };
        let session = session.read().await;
        if self
            .player_sessions
            .get(&session.player_id)
            .map(|s| s.value() == session_id)
            .unwrap_or(false)
        {
            self.player_sessions.remove(&session.player_id);
        }

        match reason {
            DisconnectReason::Transient => {
                self.grace.insert(
                    session.player_id.clone(),
                    GraceRecord {
                        player_id: session.player_id.clone(),
                        room_id: session.room_id.clone(),
                        entered_at: Utc::now(),
                    },
                );
            }
            DisconnectReason::Explicit => {
                self.grace.remove(&session.player_id);
                self.pending.remove(&session.player_id);
            }
            DisconnectReason::Superseded => {
                self.grace.remove(&session.player_id);
                self.pending.remove(&session.player_id);
                session.transport.send(&crate::broker::Envelope::new(
                    "chat.system",
                    0,
                    serde_json::json!({ "reason": "superseded" }),
                ));
            }
        }
    }

    /// Deliver directly to every session currently in `room_id`, skipping
    /// `exclude` if given, then publish on the broker for any non-player
    /// subscriber (admin tooling, metrics taps).
    pub async fn broadcast_to_room(
        &self,
        pattern_name: &str,
        room_id: &str,
        payload: Value,
        exclude: Option<&str>,
    ) -> Result<(), CoreError> {
        let mut params = crate::subject::Params::new();
        params.insert("room_id".to_string(), room_id.to_string());
        let subject = self.registry.build(pattern_name, &params)?;

        self.broker
            .publish_excluding(&subject, payload, exclude.map(str::to_string))
            .await?;
        Ok(())
    }

    pub async fn broadcast_global(&self, pattern_name: &str, payload: Value) -> Result<(), CoreError> {
        let subject = self.registry.build(pattern_name, &crate::subject::Params::new())?;
        self.broker.publish(&subject, payload).await?;
        Ok(())
    }

    /// Send directly if the player has a live session; otherwise enqueue
    /// for replay on reconnect. Returns whether it was delivered live.
    pub fn send_personal(&self, player_id: &str, envelope: crate::broker::Envelope) -> bool {
        if let Some(session_id) = self.player_sessions.get(player_id) {
            if let Some(session) = self.sessions.get(session_id.value()) {
                if let Ok(guard) = session.value().try_read() {
                    guard.transport.send(&envelope);
                    return true;
                }
            }
        }

        let dropped = self
            .pending
            .entry(player_id.to_string())
            .or_insert_with(|| PendingQueue::new(self.pending_capacity))
            .push(envelope);
        if dropped {
            crate::metrics::PENDING_QUEUE_DROPPED_TOTAL.inc();
        }
        false
    }

    /// Evict any prior session(s) for `player_id`, skipping `keep_session_id`.
    /// Idempotent.
    pub async fn handle_new_game_session(
        &self,
        player_id: &str,
        keep_session_id: &str,
    ) -> EvictionOutcome {
        let mut outcome = EvictionOutcome::default();
        if let Some(existing) = self.player_sessions.get(player_id).map(|s| s.value().clone()) {
            if existing != keep_session_id {
                self.disconnect(&existing, DisconnectReason::Superseded).await;
                outcome.disconnected_count += 1;
            }
        }
        outcome
    }

    pub fn is_in_grace(&self, player_id: &str) -> bool {
        self.grace.contains_key(player_id)
    }

    pub fn is_connected(&self, player_id: &str) -> bool {
        self.player_sessions.contains_key(player_id)
    }

    /// End any grace record older than the configured timeout, publishing
    /// `events.player_left.{room_id}` for each. Called from the background
    /// maintenance loop.
    pub async fn cleanup_expired_grace(&self) -> Result<(), ExternalError> {
        let now = Utc::now();
        let expired: Vec<GraceRecord> = self
            .grace
            .iter()
            .filter(|entry| {
                (now - entry.value().entered_at).num_seconds() >= self.grace_timeout_seconds
            })
            .map(|entry| entry.value().clone())
            .collect();

        for record in expired {
            self.grace.remove(&record.player_id);
            self.pending.remove(&record.player_id);
            let mut params = crate::subject::Params::new();
            params.insert("room_id".to_string(), record.room_id.clone());
            if let Ok(subject) = self.registry.build("event_player_left", &params) {
                if let Err(e) = self.broker.publish(&subject, Value::Null).await {
                    warn!(player_id = %record.player_id, error = %e, "failed to publish grace timeout departure");
                }
            }
        }

        self.rate_limiter.prune(10_000);
        Ok(())
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn grace_population(&self) -> usize {
        self.grace.len()
    }
}
