//! Core domain model shared by every component: players, NPCs, rooms, items.
//!
//! These are plain data types; persistence and runtime lookup are behind
//! the [`crate::persistence`] traits so components stay testable without a
//! database.

mod item;
mod npc;
mod player;
mod room;

pub use item::{Container, Item};
pub use npc::{NpcInstance, NpcPrototype};
pub use player::{EquipmentSlot, Player};
pub use room::Room;
