//! External collaborators the core depends on but does not own.
//!
//! Grounded in the teacher's `async-trait`-based service boundaries
//! (`state/managers/*`) and SPEC_FULL §6: persistence, NPC runtime, and
//! prototype lookup are abstract traits so the core stays testable without
//! a real database. Per the resolved Open Question on sync/async duplication,
//! [`Persistence`] exposes only the asynchronous shapes — the original's
//! synchronous variants are not ported.

use async_trait::async_trait;

use crate::domain::{Container, NpcPrototype, Player, Room};
use crate::error::ExternalError;

/// Player and world storage. Implementations are expected to be safe for
/// concurrent calls; the core never holds a transaction open across a
/// suspension that also touches broker delivery.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn get_player_by_id(&self, player_id: &str) -> Result<Option<Player>, ExternalError>;
    async fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, ExternalError>;
    async fn save_player(&self, player: &Player) -> Result<(), ExternalError>;

    /// Fetches the room, repairing and logging any malformed data in place
    /// rather than rejecting it (resolved Open Question 3).
    async fn get_room_by_id(&self, room_id: &str) -> Result<Option<Room>, ExternalError>;
    async fn save_room(&self, room: &Room) -> Result<(), ExternalError>;

    async fn get_players_in_room(&self, room_id: &str) -> Result<Vec<Player>, ExternalError>;
    async fn get_containers_by_room_id(&self, room_id: &str) -> Result<Vec<Container>, ExternalError>;
    async fn get_container(&self, container_id: &str) -> Result<Option<Container>, ExternalError>;
    async fn get_profession_by_id(&self, profession_id: &str) -> Result<Option<String>, ExternalError>;
}

/// Lookup into the live NPC runtime: instances currently placed in the
/// world and their base stats.
#[async_trait]
pub trait NpcRuntime: Send + Sync {
    async fn get_npc_instance(&self, npc_id: &str) -> Option<crate::domain::NpcInstance>;
    async fn get_npcs_in_room(&self, room_id: &str) -> Vec<crate::domain::NpcInstance>;
    async fn base_stats(&self, npc_id: &str) -> Option<NpcPrototype>;
}

/// Static prototype catalogue (names, descriptions) keyed by prototype id.
#[async_trait]
pub trait PrototypeRegistry: Send + Sync {
    async fn get(&self, prototype_id: &str) -> Option<NpcPrototype>;
}
