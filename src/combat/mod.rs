//! Combat engine (C8): encounter state machine, turn order, damage
//! resolution, and XP award on NPC kill.

mod engine;
mod types;

pub use engine::CombatEngine;
pub use types::{AttackOutcome, CombatInstance, CombatState, Participant, ParticipantKind};
