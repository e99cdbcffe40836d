//! A bundled in-memory world, seeded at startup. This is a reference
//! backend for the bare binary; it satisfies the `Persistence`,
//! `NpcRuntime`, and `PrototypeRegistry` contracts in-process so the
//! server is runnable without standing up a database. A deployment with
//! real durability swaps this out for its own implementation of the same
//! traits — the core never depends on this module directly.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{Container, NpcInstance, NpcPrototype, Player, Room};
use crate::error::ExternalError;
use crate::persistence::{NpcRuntime, Persistence, PrototypeRegistry};

pub struct MemoryStore {
    players: DashMap<String, Player>,
    rooms: DashMap<String, Room>,
    containers: DashMap<String, Container>,
    npcs: DashMap<String, NpcInstance>,
    prototypes: DashMap<String, NpcPrototype>,
}

impl MemoryStore {
    /// A two-room town square with one wandering rat, one admin, and one
    /// ordinary adventurer, for a runnable out-of-the-box experience.
    pub fn seeded() -> Self {
        let store = Self {
            players: DashMap::new(),
            rooms: DashMap::new(),
            containers: DashMap::new(),
            npcs: DashMap::new(),
            prototypes: DashMap::new(),
        };

        let mut square_exits = HashMap::new();
        square_exits.insert("north".to_string(), "alley_1".to_string());
        store.rooms.insert(
            "town_square".to_string(),
            Room {
                id: "town_square".to_string(),
                name: "Town Square".to_string(),
                description: "A cobblestoned square, quiet at this hour.".to_string(),
                exits: square_exits,
                drops: Vec::new(),
                containers: Vec::new(),
            },
        );

        let mut alley_exits = HashMap::new();
        alley_exits.insert("south".to_string(), "town_square".to_string());
        store.rooms.insert(
            "alley_1".to_string(),
            Room {
                id: "alley_1".to_string(),
                name: "Narrow Alley".to_string(),
                description: "Damp brick walls press close on either side.".to_string(),
                exits: alley_exits,
                drops: Vec::new(),
                containers: Vec::new(),
            },
        );

        store.prototypes.insert(
            "rat".to_string(),
            NpcPrototype {
                id: "rat".to_string(),
                name: "a mangy rat".to_string(),
                description: "A mangy rat, more scared of you than you are of it.".to_string(),
                base_hit_points: 5,
                base_dexterity: 10,
                xp_value: 7,
            },
        );
        store.npcs.insert(
            "rat_1".to_string(),
            NpcInstance {
                id: "rat_1".to_string(),
                prototype_id: "rat".to_string(),
                name: "a mangy rat".to_string(),
                room_id: "town_square".to_string(),
                hit_points: 5,
                max_hit_points: 5,
                dexterity: 10,
            },
        );

        store.players.insert(
            "hero".to_string(),
            Player {
                id: "hero".to_string(),
                name: "Hero".to_string(),
                current_room_id: "town_square".to_string(),
                hit_points: 20,
                max_hit_points: 20,
                lucidity: 20,
                max_lucidity: 20,
                dexterity: 12,
                xp: 0,
                equipment: HashMap::new(),
                inventory: Vec::new(),
                is_admin: false,
            },
        );
        store.players.insert(
            "overseer".to_string(),
            Player {
                id: "overseer".to_string(),
                name: "Overseer".to_string(),
                current_room_id: "town_square".to_string(),
                hit_points: 20,
                max_hit_points: 20,
                lucidity: 20,
                max_lucidity: 20,
                dexterity: 12,
                xp: 0,
                equipment: HashMap::new(),
                inventory: Vec::new(),
                is_admin: true,
            },
        );

        store
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn get_player_by_id(&self, player_id: &str) -> Result<Option<Player>, ExternalError> {
        Ok(self.players.get(player_id).map(|p| p.clone()))
    }

    async fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, ExternalError> {
        Ok(self
            .players
            .iter()
            .find(|entry| entry.value().name.eq_ignore_ascii_case(name))
            .map(|entry| entry.value().clone()))
    }

    async fn save_player(&self, player: &Player) -> Result<(), ExternalError> {
        self.players.insert(player.id.clone(), player.clone());
        Ok(())
    }

    async fn get_room_by_id(&self, room_id: &str) -> Result<Option<Room>, ExternalError> {
        Ok(self.rooms.get(room_id).map(|r| {
            let mut room = r.clone();
            room.repair();
            room
        }))
    }

    async fn save_room(&self, room: &Room) -> Result<(), ExternalError> {
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn get_players_in_room(&self, room_id: &str) -> Result<Vec<Player>, ExternalError> {
        Ok(self
            .players
            .iter()
            .filter(|entry| entry.value().current_room_id == room_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get_containers_by_room_id(&self, room_id: &str) -> Result<Vec<Container>, ExternalError> {
        Ok(self
            .rooms
            .get(room_id)
            .map(|r| r.containers.clone())
            .unwrap_or_default())
    }

    async fn get_container(&self, container_id: &str) -> Result<Option<Container>, ExternalError> {
        Ok(self.containers.get(container_id).map(|c| c.clone()))
    }

    async fn get_profession_by_id(&self, _profession_id: &str) -> Result<Option<String>, ExternalError> {
        Ok(None)
    }
}

#[async_trait]
impl NpcRuntime for MemoryStore {
    async fn get_npc_instance(&self, npc_id: &str) -> Option<NpcInstance> {
        self.npcs.get(npc_id).map(|n| n.clone())
    }

    async fn get_npcs_in_room(&self, room_id: &str) -> Vec<NpcInstance> {
        self.npcs
            .iter()
            .filter(|entry| entry.value().room_id == room_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    async fn base_stats(&self, npc_id: &str) -> Option<NpcPrototype> {
        let prototype_id = self.npcs.get(npc_id)?.prototype_id.clone();
        self.prototypes.get(&prototype_id).map(|p| p.clone())
    }
}

#[async_trait]
impl PrototypeRegistry for MemoryStore {
    async fn get(&self, prototype_id: &str) -> Option<NpcPrototype> {
        self.prototypes.get(prototype_id).map(|p| p.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_store_has_the_starting_rat_in_the_square() {
        let store = MemoryStore::seeded();
        let npcs = store.get_npcs_in_room("town_square").await;
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].id, "rat_1");
    }

    #[tokio::test]
    async fn save_player_is_visible_to_a_later_read() {
        let store = MemoryStore::seeded();
        let mut hero = store.get_player_by_id("hero").await.unwrap().unwrap();
        hero.xp += 7;
        store.save_player(&hero).await.unwrap();
        let reloaded = store.get_player_by_id("hero").await.unwrap().unwrap();
        assert_eq!(reloaded.xp, 7);
    }
}
