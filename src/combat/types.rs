use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatState {
    Initialising,
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Player,
    Npc,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub kind: ParticipantKind,
    pub prototype_id: Option<String>,
    pub hit_points: i64,
    pub max_hit_points: i64,
    pub dexterity: i64,
    pub alive: bool,
}

impl Participant {
    pub fn player(id: impl Into<String>, hit_points: i64, max_hit_points: i64, dexterity: i64) -> Self {
        Self {
            id: id.into(),
            kind: ParticipantKind::Player,
            prototype_id: None,
            hit_points,
            max_hit_points,
            dexterity,
            alive: true,
        }
    }

    pub fn npc(
        id: impl Into<String>,
        prototype_id: impl Into<String>,
        hit_points: i64,
        max_hit_points: i64,
        dexterity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ParticipantKind::Npc,
            prototype_id: Some(prototype_id.into()),
            hit_points,
            max_hit_points,
            dexterity,
            alive: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CombatInstance {
    pub id: String,
    pub room_id: String,
    pub state: CombatState,
    pub participants: Vec<Participant>,
    pub turn_order: Vec<String>,
    pub current_turn_index: usize,
    pub last_action_at: DateTime<Utc>,
    /// When the current turn holder's turn began, reset on every advance
    /// (attack or forced timeout).
    pub turn_started_at: DateTime<Utc>,
}

impl CombatInstance {
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.participants.iter().filter(|p| p.alive).count()
    }

    pub fn current_turn_holder(&self) -> Option<&str> {
        self.turn_order.get(self.current_turn_index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub success: bool,
    pub damage_dealt: i64,
    pub target_died: bool,
    pub combat_ended: bool,
    pub xp_awarded: u64,
}
