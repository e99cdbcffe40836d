//! Connection manager types: transports, sessions, grace records.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::broker::{Envelope, SubscriptionHandle};

/// A duplex endpoint for a connected player. Implementations deliver
/// envelopes to whatever carries bytes to the client (WebSocket, SSE, a
/// test channel); the core never depends on the transport's wire format.
pub trait Transport: Send + Sync {
    fn send(&self, envelope: &Envelope);
}

/// A live transport session attached to a player.
pub struct Session {
    pub id: String,
    pub player_id: String,
    pub room_id: String,
    pub transport: std::sync::Arc<dyn Transport>,
    pub subscriptions: Vec<SubscriptionHandle>,
    pub connected_at: DateTime<Utc>,
}

/// Why a session ended, determining whether a grace period starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Network drop, process crash, anything not requested by the player.
    Transient,
    /// Explicit `/quit` or an admin kick.
    Explicit,
    /// A new login for the same player evicted this session.
    Superseded,
}

/// Tracks a player whose session dropped transiently, pending either
/// reconnection or timeout.
#[derive(Clone)]
pub struct GraceRecord {
    pub player_id: String,
    pub room_id: String,
    pub entered_at: DateTime<Utc>,
}

/// Messages queued for a player currently in grace, capped in size with
/// the oldest entry dropped on overflow.
pub struct PendingQueue {
    pub envelopes: VecDeque<Envelope>,
    pub capacity: usize,
}

impl PendingQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            envelopes: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Push an envelope, dropping the oldest if at capacity. Returns true
    /// if an entry was dropped.
    pub fn push(&mut self, envelope: Envelope) -> bool {
        let dropped = if self.envelopes.len() >= self.capacity {
            self.envelopes.pop_front();
            true
        } else {
            false
        };
        self.envelopes.push_back(envelope);
        dropped
    }

    pub fn drain_in_order(&mut self) -> Vec<Envelope> {
        self.envelopes.drain(..).collect()
    }
}

/// Outcome of forcing out any prior sessions for a player.
#[derive(Debug, Clone, Default)]
pub struct EvictionOutcome {
    pub disconnected_count: usize,
    pub errors: Vec<String>,
}
