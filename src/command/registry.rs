//! Dispatch stage: verb-indexed handler table with per-verb usage counters
//! and instrumented spans, grounded in the teacher's command registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::error::CoreError;

use super::context::{CommandContext, CommandOutcome, Services};
use super::handlers::{
    AttackHandler, CastHandler, FollowHandler, FollowingHandler, Handler, LookHandler,
    MoveHandler, SayHandler, UnfollowHandler,
};
use super::{alias, gate, parse, sanitise};

pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    usage_counts: HashMap<&'static str, Arc<AtomicU64>>,
}

impl Registry {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();
        handlers.insert("look", Box::new(LookHandler));
        handlers.insert("say", Box::new(SayHandler));
        handlers.insert("attack", Box::new(AttackHandler));
        handlers.insert("follow", Box::new(FollowHandler));
        handlers.insert("unfollow", Box::new(UnfollowHandler));
        handlers.insert("following", Box::new(FollowingHandler));
        handlers.insert("cast", Box::new(CastHandler));
        handlers.insert("go_north", Box::new(MoveHandler { direction: "north" }));
        handlers.insert("go_south", Box::new(MoveHandler { direction: "south" }));
        handlers.insert("go_east", Box::new(MoveHandler { direction: "east" }));
        handlers.insert("go_west", Box::new(MoveHandler { direction: "west" }));
        handlers.insert("go_up", Box::new(MoveHandler { direction: "up" }));
        handlers.insert("go_down", Box::new(MoveHandler { direction: "down" }));

        let usage_counts = handlers.keys().map(|&verb| (verb, Arc::new(AtomicU64::new(0)))).collect();

        Self {
            handlers,
            usage_counts,
        }
    }

    pub fn command_counts(&self) -> HashMap<&'static str, u64> {
        self.usage_counts
            .iter()
            .map(|(verb, count)| (*verb, count.load(Ordering::Relaxed)))
            .collect()
    }

    /// Run the full pipeline (gate, sanitise, parse, dispatch) over a raw
    /// input line.
    pub async fn dispatch(
        &self,
        services: &Services,
        player_id: &str,
        raw_line: &str,
        max_length: usize,
        shutting_down: bool,
        in_grace: bool,
    ) -> Result<CommandOutcome, CoreError> {
        let verb_guess = raw_line.split(' ').next().unwrap_or("");
        let probable_verb = alias::resolve(&verb_guess.to_ascii_lowercase()).to_string();
        gate::check(&probable_verb, shutting_down, in_grace)?;

        let sanitised = sanitise::sanitise(raw_line, max_length)?;
        let parsed = parse::parse(&sanitised);

        let span = tracing::span!(
            tracing::Level::DEBUG,
            "command.dispatch",
            command = %parsed.verb,
            player_id = %player_id,
        );

        let Some(handler) = self.handlers.get(parsed.verb.as_str()) else {
            return Ok(CommandOutcome::text(format!("Unknown command: '{}'.", parsed.verb)));
        };

        if let Some(counter) = self.usage_counts.get(parsed.verb.as_str()) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let ctx = CommandContext {
            player_id,
            services,
            args: &parsed.args,
        };

        let start = Instant::now();
        let result = handler.handle(&ctx).instrument(span).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(_) => crate::metrics::record_command(&parsed.verb, elapsed),
            Err(err) => {
                crate::metrics::record_command(&parsed.verb, elapsed);
                crate::metrics::record_command_error(&parsed.verb, err.error_code());
            }
        }

        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MessageBroker;
    use crate::combat::CombatEngine;
    use crate::config::{CombatConfig, ConnectionConfig, GraceConfig, PendingConfig, SubjectConfig};
    use crate::connection::ConnectionManager;
    use crate::domain::{NpcPrototype, Player, Room};
    use crate::error::ExternalError;
    use crate::follow::FollowCoordinator;
    use crate::persistence::{NpcRuntime, Persistence, PrototypeRegistry};
    use async_trait::async_trait;
    use std::collections::HashMap as Map;

    struct FakePersistence {
        room: Room,
        player: Player,
    }

    #[async_trait]
    impl Persistence for FakePersistence {
        async fn get_player_by_id(&self, _: &str) -> Result<Option<Player>, ExternalError> {
            Ok(Some(self.player.clone()))
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
            Ok(vec![self.player.clone()])
        }
        async fn get_containers_by_room_id(&self, _: &str) -> Result<Vec<crate::domain::Container>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_container(&self, _: &str) -> Result<Option<crate::domain::Container>, ExternalError> {
            Ok(None)
        }
        async fn get_profession_by_id(&self, _: &str) -> Result<Option<String>, ExternalError> {
            Ok(None)
        }
    }

    struct FakeNpcRuntime;

    #[async_trait]
    impl NpcRuntime for FakeNpcRuntime {
        async fn get_npc_instance(&self, _: &str) -> Option<crate::domain::NpcInstance> {
            None
        }
        async fn get_npcs_in_room(&self, _: &str) -> Vec<crate::domain::NpcInstance> {
            Vec::new()
        }
        async fn base_stats(&self, _: &str) -> Option<NpcPrototype> {
            None
        }
    }

    struct FakePrototypes;

    #[async_trait]
    impl PrototypeRegistry for FakePrototypes {
        async fn get(&self, _: &str) -> Option<NpcPrototype> {
            None
        }
    }

    fn services() -> Services {
        let subject_config = SubjectConfig::default();
        let registry = Arc::new(crate::subject::SubjectRegistry::new(&subject_config));
        let broker = MessageBroker::new(registry.clone(), None);
        let connections = Arc::new(ConnectionManager::new(
            broker.clone(),
            registry.clone(),
            &ConnectionConfig::default(),
            &GraceConfig::default(),
            &PendingConfig::default(),
        ));
        let persistence = Arc::new(FakePersistence {
            room: Room {
                id: "room-1".to_string(),
                name: "A town square.".to_string(),
                description: "Cobblestones underfoot.".to_string(),
                exits: Map::new(),
                drops: Vec::new(),
                containers: Vec::new(),
            },
            player: Player {
                id: "hero".to_string(),
                name: "Hero".to_string(),
                current_room_id: "room-1".to_string(),
                hit_points: 20,
                max_hit_points: 20,
                lucidity: 20,
                max_lucidity: 20,
                dexterity: 10,
                xp: 0,
                equipment: Map::new(),
                inventory: Vec::new(),
                is_admin: false,
            },
        });
        let prototypes = Arc::new(FakePrototypes);
        let combat = Arc::new(CombatEngine::new(
            broker.clone(),
            registry.clone(),
            persistence.clone(),
            prototypes.clone(),
            &CombatConfig::default(),
            Map::new(),
        ));

        Services {
            persistence,
            npc_runtime: Arc::new(FakeNpcRuntime),
            prototype_registry: prototypes,
            connections,
            broker,
            subjects: registry,
            combat,
            follow: Arc::new(FollowCoordinator::new()),
        }
    }

    #[tokio::test]
    async fn unknown_verb_returns_a_canned_reply() {
        let registry = Registry::new();
        let services = services();
        let outcome = registry
            .dispatch(&services, "hero", "dance", 50, false, false)
            .await
            .unwrap();
        assert_eq!(outcome.text, "Unknown command: 'dance'.");
    }

    #[tokio::test]
    async fn look_with_no_args_renders_the_room() {
        let registry = Registry::new();
        let services = services();
        let outcome = registry
            .dispatch(&services, "hero", "look", 50, false, false)
            .await
            .unwrap();
        assert!(outcome.text.contains("A town square."));
    }

    #[tokio::test]
    async fn gate_blocks_combat_during_grace() {
        let registry = Registry::new();
        let services = services();
        let err = registry
            .dispatch(&services, "hero", "attack rat", 50, false, true)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "grace_period_blocked");
    }

    #[tokio::test]
    async fn usage_counters_increment_on_dispatch() {
        let registry = Registry::new();
        let services = services();
        registry.dispatch(&services, "hero", "look", 50, false, false).await.unwrap();
        registry.dispatch(&services, "hero", "look", 50, false, false).await.unwrap();
        assert_eq!(registry.command_counts()["look"], 2);
    }

    #[tokio::test]
    async fn overlength_command_is_rejected_before_dispatch() {
        let registry = Registry::new();
        let services = services();
        let long = "a".repeat(60);
        let err = registry
            .dispatch(&services, "hero", &long, 50, false, false)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "command_too_long");
    }
}
