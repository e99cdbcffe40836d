//! Rooms.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::item::{Container, Item};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Direction (e.g. "north") -> destination room id.
    pub exits: HashMap<String, String>,
    pub drops: Vec<Item>,
    pub containers: Vec<Container>,
}

impl Room {
    /// Best-effort repair of malformed data: missing name/description are
    /// filled with placeholders and logged by the caller rather than
    /// rejecting the room outright.
    pub fn repair(&mut self) -> Vec<&'static str> {
        let mut fixed = Vec::new();
        if self.name.trim().is_empty() {
            self.name = "An unremarkable place".to_string();
            fixed.push("name");
        }
        if self.description.trim().is_empty() {
            self.description = "You see nothing special.".to_string();
            fixed.push("description");
        }
        self.exits.retain(|_, dest| !dest.trim().is_empty());
        fixed
    }
}
