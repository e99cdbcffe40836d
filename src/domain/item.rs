//! Items and containers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub long_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub locked: bool,
    pub capacity: usize,
    pub contents: Vec<Item>,
}

impl Container {
    pub fn used_slots(&self) -> usize {
        self.contents.len()
    }
}
