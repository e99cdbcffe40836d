//! Presence & room occupancy (C4): compute what a viewer sees occupying a
//! room, annotating linkdead players from the connection manager's grace
//! set.

use std::sync::Arc;

use crate::connection::ConnectionManager;
use crate::domain::{Container, Item, NpcInstance, Player};
use crate::error::ExternalError;
use crate::persistence::{NpcRuntime, Persistence};

/// One rendered occupant line: a player's display name, annotated
/// "(linkdead)" if they're in the connection manager's grace set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupantName {
    pub name: String,
    pub linkdead: bool,
}

impl OccupantName {
    pub fn display(&self) -> String {
        if self.linkdead {
            format!("{} (linkdead)", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomOccupants {
    pub players: Vec<OccupantName>,
    pub npcs: Vec<NpcInstance>,
    pub containers: Vec<Container>,
    pub drops: Vec<Item>,
}

pub struct PresenceView {
    connections: Arc<ConnectionManager>,
    persistence: Arc<dyn Persistence>,
    npc_runtime: Arc<dyn NpcRuntime>,
}

impl PresenceView {
    pub fn new(
        connections: Arc<ConnectionManager>,
        persistence: Arc<dyn Persistence>,
        npc_runtime: Arc<dyn NpcRuntime>,
    ) -> Self {
        Self {
            connections,
            persistence,
            npc_runtime,
        }
    }

    /// Players first, then NPCs, then containers, then drops, all in
    /// stable insertion order, excluding the viewer from the player list.
    pub async fn list_occupants(
        &self,
        room_id: &str,
        viewer_id: &str,
    ) -> Result<RoomOccupants, ExternalError> {
        let players = self
            .persistence
            .get_players_in_room(room_id)
            .await?
            .into_iter()
            .filter(|p: &Player| p.id != viewer_id)
            .map(|p| OccupantName {
                linkdead: self.connections.is_in_grace(&p.id),
                name: p.name,
            })
            .collect();

        let npcs = self.npc_runtime.get_npcs_in_room(room_id).await;
        let containers = self.persistence.get_containers_by_room_id(room_id).await?;
        let room = self.persistence.get_room_by_id(room_id).await?;
        let drops = room.map(|r| r.drops).unwrap_or_default();

        Ok(RoomOccupants {
            players,
            npcs,
            containers,
            drops,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Room;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakePersistence {
        players: Vec<Player>,
        room: Room,
    }

    #[async_trait]
    impl Persistence for FakePersistence {
        async fn get_player_by_id(&self, _: &str) -> Result<Option<Player>, ExternalError> {
            Ok(None)
        }
        async fn get_player_by_name(&self, _: &str) -> Result<Option<Player>, ExternalError> {
            Ok(None)
        }
        async fn save_player(&self, _: &Player) -> Result<(), ExternalError> {
            Ok(())
        }
        async fn get_room_by_id(&self, _: &str) -> Result<Option<Room>, ExternalError> {
            Ok(Some(self.room.clone()))
        }
        async fn save_room(&self, _: &Room) -> Result<(), ExternalError> {
            Ok(())
        }
        async fn get_players_in_room(&self, _: &str) -> Result<Vec<Player>, ExternalError> {
            Ok(self.players.clone())
        }
        async fn get_containers_by_room_id(&self, _: &str) -> Result<Vec<Container>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_container(&self, _: &str) -> Result<Option<Container>, ExternalError> {
            Ok(None)
        }
        async fn get_profession_by_id(&self, _: &str) -> Result<Option<String>, ExternalError> {
            Ok(None)
        }
    }

    struct FakeNpcRuntime;

    #[async_trait]
    impl NpcRuntime for FakeNpcRuntime {
        async fn get_npc_instance(&self, _: &str) -> Option<NpcInstance> {
            None
        }
        async fn get_npcs_in_room(&self, _: &str) -> Vec<NpcInstance> {
            Vec::new()
        }
        async fn base_stats(&self, _: &str) -> Option<crate::domain::NpcPrototype> {
            None
        }
    }

    fn player(id: &str, name: &str) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
            current_room_id: "arkham_1".to_string(),
            hit_points: 10,
            max_hit_points: 10,
            lucidity: 10,
            max_lucidity: 10,
            dexterity: 10,
            xp: 0,
            equipment: HashMap::new(),
            inventory: Vec::new(),
            is_admin: false,
        }
    }

    fn view(players: Vec<Player>) -> PresenceView {
        let subject_config = crate::config::SubjectConfig::default();
        let registry = Arc::new(crate::subject::SubjectRegistry::new(&subject_config));
        let broker = crate::broker::MessageBroker::new(registry.clone(), None);
        let connections = Arc::new(ConnectionManager::new(
            broker,
            registry,
            &crate::config::ConnectionConfig::default(),
            &crate::config::GraceConfig::default(),
            &crate::config::PendingConfig::default(),
        ));
        let persistence = Arc::new(FakePersistence {
            players,
            room: Room {
                id: "arkham_1".to_string(),
                name: "Arkham".to_string(),
                description: "".to_string(),
                exits: HashMap::new(),
                drops: Vec::new(),
                containers: Vec::new(),
            },
        });
        PresenceView::new(connections, persistence, Arc::new(FakeNpcRuntime))
    }

    #[tokio::test]
    async fn viewer_is_excluded_from_the_player_list() {
        let view = view(vec![player("alice", "Alice"), player("bob", "Bob")]);
        let occupants = view.list_occupants("arkham_1", "alice").await.unwrap();
        assert_eq!(occupants.players, vec![OccupantName { name: "Bob".to_string(), linkdead: false }]);
    }

    #[tokio::test]
    async fn grace_period_players_are_annotated_linkdead() {
        let view = view(vec![player("bob", "Bob")]);
        let session_id = view
            .connections
            .connect(Arc::new(NoopTransport), "bob", "arkham_1")
            .await
            .unwrap();

        view.connections
            .disconnect(&session_id, crate::connection::DisconnectReason::Transient)
            .await;
        assert!(view.connections.is_in_grace("bob"));

        let occupants = view.list_occupants("arkham_1", "someone_else").await.unwrap();
        assert!(occupants.players.iter().any(|p| p.name == "Bob" && p.linkdead));
    }

    struct NoopTransport;
    impl crate::connection::Transport for NoopTransport {
        fn send(&self, _: &crate::broker::Envelope) {}
    }
}
