//! Broker wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A published message: subject plus payload, stamped with a sequence
/// number and timestamp at publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub subject: String,
    /// The subject's second token (`chat.say.room.x` -> `say`), derived at
    /// construction so consumers can filter by kind without re-parsing.
    pub event_kind: String,
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
    /// Which player this envelope concerns, when the subject is
    /// player-scoped. Filled in by the broker from the matching subject
    /// pattern's placeholder names.
    pub player_id: Option<String>,
    /// Which room this envelope concerns, when the subject is room-scoped.
    pub room_id: Option<String>,
    /// Set by `publish_excluding` so a subscriber can skip delivering to
    /// itself without the broker needing to know about players at all.
    pub exclude_player_id: Option<String>,
}

impl Envelope {
    pub fn new(subject: impl Into<String>, sequence: u64, payload: Value) -> Self {
        let subject = subject.into();
        let event_kind = subject.split('.').nth(1).unwrap_or(&subject).to_string();
        Self {
            subject,
            event_kind,
            sequence,
            timestamp: Utc::now(),
            payload,
            player_id: None,
            room_id: None,
            exclude_player_id: None,
        }
    }

    pub fn with_player_id(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    pub fn with_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }
}
