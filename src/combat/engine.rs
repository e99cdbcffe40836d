//! Combat instance bookkeeping. Grounded in the teacher's `ClientManager`
//! concurrency idiom: a `DashMap` of `Arc<RwLock<T>>` per entity, collect
//! candidates before acting to avoid holding locks across removal.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::broker::MessageBroker;
use crate::config::CombatConfig;
use crate::error::{CombatError, ExternalError};
use crate::persistence::{Persistence, PrototypeRegistry};
use crate::subject::SubjectRegistry;

use super::types::{AttackOutcome, CombatInstance, CombatState, Participant, ParticipantKind};

pub struct CombatEngine {
    combats: DashMap<String, Arc<RwLock<CombatInstance>>>,
    player_combat: DashMap<String, String>,
    direct_xp: HashMap<String, u64>,
    broker: Arc<MessageBroker>,
    registry: Arc<SubjectRegistry>,
    persistence: Arc<dyn Persistence>,
    prototypes: Arc<dyn PrototypeRegistry>,
    idle_cleanup_seconds: i64,
    turn_timeout_seconds: i64,
}

impl CombatEngine {
    pub fn new(
        broker: Arc<MessageBroker>,
        registry: Arc<SubjectRegistry>,
        persistence: Arc<dyn Persistence>,
        prototypes: Arc<dyn PrototypeRegistry>,
        config: &CombatConfig,
        direct_xp: HashMap<String, u64>,
    ) -> Self {
        Self {
            combats: DashMap::new(),
            player_combat: DashMap::new(),
            direct_xp,
            broker,
            registry,
            persistence,
            prototypes,
            idle_cleanup_seconds: config.idle_cleanup_seconds as i64,
            turn_timeout_seconds: config.turn_timeout_seconds as i64,
        }
    }

    async fn publish(&self, pattern_name: &str, room_or_player_id: &str, payload: serde_json::Value) {
        let params: HashMap<String, String> =
            HashMap::from([(subject_param(pattern_name), room_or_player_id.to_string())]);
        match self.registry.build(pattern_name, &params) {
            Ok(subject) => {
                if let Err(err) = self.broker.publish(&subject, payload).await {
                    tracing::warn!(pattern = pattern_name, error = %err, "failed to publish combat event");
                }
            }
            Err(err) => {
                tracing::warn!(pattern = pattern_name, error = %err, "failed to build combat subject");
            }
        }
    }

    pub async fn start_combat(
        &self,
        room_id: &str,
        attacker: Participant,
        target: Participant,
    ) -> Arc<RwLock<CombatInstance>> {
        let mut participants = vec![attacker, target];
        participants.sort_by(|a, b| b.dexterity.cmp(&a.dexterity).then(a.id.cmp(&b.id)));
        let turn_order = participants.iter().map(|p| p.id.clone()).collect();

        let combat_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let instance = CombatInstance {
            id: combat_id.clone(),
            room_id: room_id.to_string(),
            state: CombatState::Active,
            participants,
            turn_order,
            current_turn_index: 0,
            last_action_at: now,
            turn_started_at: now,
        };

        for participant in &instance.participants {
            if participant.kind == ParticipantKind::Player {
                self.player_combat.insert(participant.id.clone(), combat_id.clone());
            }
        }

        self.publish(
            "combat_started",
            room_id,
            json!({ "combat_id": combat_id, "room_id": room_id }),
        )
        .await;

        let handle = Arc::new(RwLock::new(instance));
        self.combats.insert(combat_id, handle.clone());
        handle
    }

    async fn xp_for_npc(&self, npc_id: &str, prototype_id: &str) -> u64 {
        if let Some(xp) = self.direct_xp.get(npc_id) {
            return *xp;
        }
        self.prototypes
            .get(prototype_id)
            .await
            .map(|proto| proto.xp_value)
            .unwrap_or(0)
    }

    pub async fn process_attack(
        &self,
        attacker_id: &str,
        target_id: &str,
        damage: i64,
    ) -> Result<AttackOutcome, CombatError> {
        let combat_id = self
            .player_combat
            .get(attacker_id)
            .map(|entry| entry.value().clone())
            .ok_or(CombatError::NotInCombat)?;

        let handle = self.combats.get(&combat_id).map(|e| e.value().clone()).ok_or(CombatError::NotInCombat)?;

        let (room_id, target_died, target_kind, target_prototype, combat_ended, next_turn_holder) = {
            let mut instance = handle.write().await;

            if instance.state == CombatState::Ended {
                return Err(CombatError::CombatEnded);
            }
            if instance.participant(target_id).is_none() {
                return Err(CombatError::TargetNotParticipant);
            }

            // Auto-advance to the attacker's turn within the round, bounded
            // to one full lap so a stale attacker id can't spin forever.
            if instance.current_turn_holder() != Some(attacker_id) {
                match instance.turn_order.iter().position(|id| id == attacker_id) {
                    Some(idx) => instance.current_turn_index = idx,
                    None => return Err(CombatError::NotYourTurn),
                }
            }

            let mut target_died = false;
            if let Some(target) = instance.participant_mut(target_id) {
                target.hit_points -= damage;
                if target.hit_points <= 0 && target.alive {
                    target.alive = false;
                    target_died = true;
                }
            }

            let target_kind = instance.participant(target_id).map(|p| p.kind);
            let target_prototype = instance.participant(target_id).and_then(|p| p.prototype_id.clone());
            let room_id = instance.room_id.clone();

            let alive_count = instance.alive_count();
            let mut combat_ended = false;
            let mut next_turn_holder = None;
            let now = Utc::now();
            if alive_count < 2 {
                instance.state = CombatState::Ended;
                combat_ended = true;
            } else {
                let len = instance.turn_order.len();
                instance.current_turn_index = (instance.current_turn_index + 1) % len;
                instance.turn_started_at = now;
                next_turn_holder = instance.current_turn_holder().map(str::to_string);
            }
            instance.last_action_at = now;

            (room_id, target_died, target_kind, target_prototype, combat_ended, next_turn_holder)
        };

        self.publish(
            "combat_attack",
            &room_id,
            json!({ "combat_id": combat_id, "attacker_id": attacker_id, "target_id": target_id }),
        )
        .await;
        self.publish(
            "combat_damage",
            &room_id,
            json!({ "combat_id": combat_id, "attacker_id": attacker_id, "target_id": target_id, "damage": damage, "target_died": target_died }),
        )
        .await;

        let mut xp_awarded = 0u64;
        if target_died {
            if target_kind == Some(ParticipantKind::Npc) {
                if let Some(prototype_id) = &target_prototype {
                    xp_awarded = self.xp_for_npc(target_id, prototype_id).await;
                    if xp_awarded > 0 {
                        self.award_xp(attacker_id, xp_awarded).await;
                    }
                }
                self.publish(
                    "combat_npc_died",
                    &room_id,
                    json!({ "combat_id": combat_id, "npc_id": target_id, "xp_awarded": xp_awarded }),
                )
                .await;
            } else {
                self.publish(
                    "event_player_died",
                    &room_id,
                    json!({ "combat_id": combat_id, "player_id": target_id }),
                )
                .await;
            }
        }

        if combat_ended {
            self.finish(&combat_id, &room_id, "elimination").await;
        } else if let Some(holder) = next_turn_holder {
            self.publish(
                "combat_turn",
                &room_id,
                json!({ "combat_id": combat_id, "player_id": holder }),
            )
            .await;
        }

        Ok(AttackOutcome {
            success: true,
            damage_dealt: damage,
            target_died,
            combat_ended,
            xp_awarded,
        })
    }

    async fn award_xp(&self, player_id: &str, xp: u64) {
        let player = match self.persistence.get_player_by_id(player_id).await {
            Ok(Some(player)) => player,
            _ => return,
        };
        let mut updated = player;
        updated.xp = updated.xp.saturating_add(xp);
        if self.persistence.save_player(&updated).await.is_ok() {
            self.publish(
                "combat_dp_update",
                player_id,
                json!({ "player_id": player_id, "xp_awarded": xp, "total_xp": updated.xp }),
            )
            .await;
        }
    }

    async fn finish(&self, combat_id: &str, room_id: &str, reason: &str) {
        if let Some((_, handle)) = self.combats.remove(combat_id) {
            let instance = handle.read().await;
            for participant in &instance.participants {
                if participant.kind == ParticipantKind::Player {
                    self.player_combat.remove(&participant.id);
                }
            }
        }
        self.publish(
            "combat_ended",
            room_id,
            json!({ "combat_id": combat_id, "reason": reason }),
        )
        .await;
    }

    pub async fn end_combat(&self, combat_id: &str, reason: &str) -> Result<(), CombatError> {
        let room_id = {
            let handle = self.combats.get(combat_id).map(|e| e.value().clone()).ok_or(CombatError::NotInCombat)?;
            let mut instance = handle.write().await;
            instance.state = CombatState::Ended;
            instance.room_id.clone()
        };
        self.finish(combat_id, &room_id, reason).await;
        Ok(())
    }

    pub async fn cleanup_stale_combats(&self) -> Result<(), ExternalError> {
        let now = Utc::now();
        let stale: Vec<(String, String)> = {
            let mut out = Vec::new();
            for entry in self.combats.iter() {
                let instance = entry.value().read().await;
                let age = (now - instance.last_action_at).num_seconds();
                if age > self.idle_cleanup_seconds {
                    out.push((instance.id.clone(), instance.room_id.clone()));
                }
            }
            out
        };
        for (combat_id, room_id) in stale {
            self.finish(&combat_id, &room_id, "timeout").await;
        }
        Ok(())
    }

    /// Force-advance any combat whose current turn holder has sat on their
    /// turn longer than `turn_timeout_seconds`, publishing `combat_timeout`
    /// for the holder who timed out and `combat_turn` for whoever is up
    /// next. Called from the background maintenance loop alongside
    /// [`cleanup_stale_combats`](Self::cleanup_stale_combats).
    pub async fn enforce_turn_timeouts(&self) -> Result<(), ExternalError> {
        let now = Utc::now();
        let stale_ids: Vec<String> = {
            let mut out = Vec::new();
            for entry in self.combats.iter() {
                let instance = entry.value().read().await;
                if instance.state == CombatState::Active
                    && (now - instance.turn_started_at).num_seconds() > self.turn_timeout_seconds
                {
                    out.push(instance.id.clone());
                }
            }
            out
        };

        for combat_id in stale_ids {
            let Some(handle) = self.combats.get(&combat_id).map(|e| e.value().clone()) else {
                continue;
            };
            let advanced = {
                let mut instance = handle.write().await;
                let len = instance.turn_order.len();
                if len == 0 {
                    None
                } else {
                    let stale_holder = instance.current_turn_holder().unwrap_or_default().to_string();
                    instance.current_turn_index = (instance.current_turn_index + 1) % len;
                    instance.turn_started_at = now;
                    let new_holder = instance.current_turn_holder().unwrap_or_default().to_string();
                    Some((instance.room_id.clone(), stale_holder, new_holder))
                }
            };

            if let Some((room_id, stale_holder, new_holder)) = advanced {
                self.publish(
                    "combat_timeout",
                    &room_id,
                    json!({ "combat_id": combat_id, "player_id": stale_holder }),
                )
                .await;
                self.publish(
                    "combat_turn",
                    &room_id,
                    json!({ "combat_id": combat_id, "player_id": new_holder }),
                )
                .await;
            }
        }
        Ok(())
    }

    pub fn is_player_in_combat(&self, player_id: &str) -> bool {
        self.player_combat.contains_key(player_id)
    }

    pub fn active_combat_count(&self) -> usize {
        self.combats.len()
    }
}

fn subject_param(pattern_name: &str) -> String {
    match pattern_name {
        "combat_dp_update" => "player_id".to_string(),
        _ => "room_id".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubjectConfig;
    use crate::domain::{NpcPrototype, Player};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct FakePersistence {
        players: DashMap<String, StdMutex<Player>>,
    }

    fn player_fixture(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            current_room_id: "room-1".to_string(),
            hit_points: 20,
            max_hit_points: 20,
            lucidity: 20,
            max_lucidity: 20,
            dexterity: 10,
            xp: 0,
            equipment: Default::default(),
            inventory: Vec::new(),
            is_admin: false,
        }
    }

    #[async_trait]
    impl Persistence for FakePersistence {
        async fn get_player_by_id(&self, player_id: &str) -> Result<Option<Player>, ExternalError> {
            Ok(self.players.get(player_id).map(|p| p.lock().unwrap().clone()))
        }
        async fn get_player_by_name(&self, _name: &str) -> Result<Option<Player>, ExternalError> {
            Ok(None)
        }
        async fn save_player(&self, player: &Player) -> Result<(), ExternalError> {
            self.players
                .entry(player.id.clone())
                .and_modify(|p| *p.lock().unwrap() = player.clone())
                .or_insert_with(|| StdMutex::new(player.clone()));
            Ok(())
        }
        async fn get_room_by_id(&self, _room_id: &str) -> Result<Option<crate::domain::Room>, ExternalError> {
            Ok(None)
        }
        async fn save_room(&self, _room: &crate::domain::Room) -> Result<(), ExternalError> {
            Ok(())
        }
        async fn get_players_in_room(&self, _room_id: &str) -> Result<Vec<Player>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_containers_by_room_id(
            &self,
            _room_id: &str,
        ) -> Result<Vec<crate::domain::Container>, ExternalError> {
            Ok(Vec::new())
        }
        async fn get_container(&self, _container_id: &str) -> Result<Option<crate::domain::Container>, ExternalError> {
            Ok(None)
        }
        async fn get_profession_by_id(&self, _profession_id: &str) -> Result<Option<String>, ExternalError> {
            Ok(None)
        }
    }

    struct FakePrototypes;

    #[async_trait]
    impl PrototypeRegistry for FakePrototypes {
        async fn get(&self, prototype_id: &str) -> Option<NpcPrototype> {
            Some(NpcPrototype {
                id: prototype_id.to_string(),
                name: "a rat".to_string(),
                description: "a rat".to_string(),
                base_hit_points: 5,
                base_dexterity: 3,
                xp_value: 10,
            })
        }
    }

    fn engine() -> CombatEngine {
        let registry = Arc::new(SubjectRegistry::new(&SubjectConfig::default()));
        let broker = MessageBroker::new(registry.clone(), None);
        let persistence = Arc::new(FakePersistence { players: DashMap::new() });
        persistence.players.insert("hero".to_string(), StdMutex::new(player_fixture("hero")));
        CombatEngine::new(
            broker,
            registry,
            persistence,
            Arc::new(FakePrototypes),
            &CombatConfig::default(),
            HashMap::new(),
        )
    }

    #[tokio::test]
    async fn killing_an_npc_awards_xp_and_ends_combat() {
        let engine = engine();
        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 5, 5, 3);
        engine.start_combat("room-1", attacker, target).await;

        let outcome = engine.process_attack("hero", "rat-1", 10).await.unwrap();
        assert!(outcome.target_died);
        assert!(outcome.combat_ended);
        assert_eq!(outcome.xp_awarded, 10);
        assert!(!engine.is_player_in_combat("hero"));

        let player = engine.persistence.get_player_by_id("hero").await.unwrap().unwrap();
        assert_eq!(player.xp, 10);
    }

    #[tokio::test]
    async fn non_lethal_attack_keeps_combat_active_and_advances_turn() {
        let engine = engine();
        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 20, 20, 3);
        engine.start_combat("room-1", attacker, target).await;

        let outcome = engine.process_attack("hero", "rat-1", 5).await.unwrap();
        assert!(!outcome.target_died);
        assert!(!outcome.combat_ended);
        assert!(engine.is_player_in_combat("hero"));
    }

    #[tokio::test]
    async fn non_lethal_attack_publishes_attack_damage_and_turn_events() {
        let engine = engine();
        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 20, 20, 3);
        engine.start_combat("room-1", attacker, target).await;

        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let _handle = engine.broker.subscribe("combat.>", move |envelope| {
            received_clone.lock().unwrap().push(envelope.subject.clone());
        });

        engine.process_attack("hero", "rat-1", 5).await.unwrap();

        let subjects = received.lock().unwrap();
        assert!(subjects.contains(&"combat.attack.room-1".to_string()));
        assert!(subjects.contains(&"combat.damage.room-1".to_string()));
        assert!(subjects.contains(&"combat.turn.room-1".to_string()));
    }

    #[tokio::test]
    async fn turn_timeout_advances_the_stale_holder_and_publishes_timeout() {
        let registry = Arc::new(SubjectRegistry::new(&SubjectConfig::default()));
        let broker = MessageBroker::new(registry.clone(), None);
        let persistence = Arc::new(FakePersistence { players: DashMap::new() });
        let engine = CombatEngine::new(
            broker,
            registry,
            persistence,
            Arc::new(FakePrototypes),
            &CombatConfig { turn_timeout_seconds: 0, idle_cleanup_seconds: 3600 },
            HashMap::new(),
        );

        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 20, 20, 3);
        let handle = engine.start_combat("room-1", attacker, target).await;
        let holder_before = handle.read().await.current_turn_holder().unwrap().to_string();

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        engine.enforce_turn_timeouts().await.unwrap();

        let holder_after = handle.read().await.current_turn_holder().unwrap().to_string();
        assert_ne!(holder_before, holder_after);
    }

    #[tokio::test]
    async fn attacking_without_a_combat_is_rejected() {
        let engine = engine();
        let err = engine.process_attack("ghost", "rat-1", 5).await.unwrap_err();
        assert_eq!(err, CombatError::NotInCombat);
    }

    #[tokio::test]
    async fn attacking_a_non_participant_is_rejected() {
        let engine = engine();
        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 20, 20, 3);
        engine.start_combat("room-1", attacker, target).await;

        let err = engine.process_attack("hero", "nobody", 5).await.unwrap_err();
        assert_eq!(err, CombatError::TargetNotParticipant);
    }

    #[tokio::test]
    async fn ending_combat_clears_in_combat_state() {
        let engine = engine();
        let attacker = Participant::player("hero", 20, 20, 10);
        let target = Participant::npc("rat-1", "rat", 20, 20, 3);
        let handle = engine.start_combat("room-1", attacker, target).await;
        let combat_id = handle.read().await.id.clone();

        engine.end_combat(&combat_id, "fled").await.unwrap();
        assert!(!engine.is_player_in_combat("hero"));
        assert_eq!(engine.active_combat_count(), 0);
    }
}
