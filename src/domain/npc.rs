//! NPCs: a per-room instance backed by a shared prototype.

use serde::{Deserialize, Serialize};

/// Static template shared by every instance of an NPC kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcPrototype {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_hit_points: i64,
    pub base_dexterity: i64,
    /// XP awarded for killing an instance of this prototype, used as a
    /// fallback when no direct id-to-xp mapping exists.
    pub xp_value: u64,
}

/// A live instance of a prototype placed in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcInstance {
    pub id: String,
    pub prototype_id: String,
    pub name: String,
    pub room_id: String,
    pub hit_points: i64,
    pub max_hit_points: i64,
    pub dexterity: i64,
}

impl NpcInstance {
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    /// Name with punctuation stripped, used by target resolution's
    /// substring matching.
    pub fn name_without_punctuation(&self) -> String {
        self.name
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect()
    }
}
