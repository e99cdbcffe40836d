//! Player character state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Equipment slots. `is_visible` governs whether the slot appears in
/// another player's look output — `Belt` and `Backpack` are storage, not
/// worn appearance, and stay hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Torso,
    Legs,
    Hands,
    Feet,
    MainHand,
    OffHand,
    Belt,
    Backpack,
}

impl EquipmentSlot {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Belt | Self::Backpack)
    }

    pub fn visible_slots() -> &'static [EquipmentSlot] {
        &[
            Self::Head,
            Self::Torso,
            Self::Legs,
            Self::Hands,
            Self::Feet,
            Self::MainHand,
            Self::OffHand,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub current_room_id: String,
    pub hit_points: i64,
    pub max_hit_points: i64,
    pub lucidity: i64,
    pub max_lucidity: i64,
    pub dexterity: i64,
    pub xp: u64,
    pub equipment: HashMap<EquipmentSlot, Item>,
    pub inventory: Vec<Item>,
    pub is_admin: bool,
}

impl Player {
    pub fn health_fraction(&self) -> f64 {
        if self.max_hit_points <= 0 {
            return 0.0;
        }
        self.hit_points as f64 / self.max_hit_points as f64
    }

    pub fn lucidity_fraction(&self) -> f64 {
        if self.max_lucidity <= 0 {
            return 0.0;
        }
        self.lucidity as f64 / self.max_lucidity as f64
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }
}
