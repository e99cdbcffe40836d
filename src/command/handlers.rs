//! Concrete command handlers. Each handler receives a [`CommandContext`]
//! and returns a [`CommandOutcome`] or a typed [`CoreError`].

use async_trait::async_trait;
use serde_json::json;

use crate::combat::Participant;
use crate::error::{CoreError, InputError};
use crate::follow::LeaderKind;
use crate::look;
use crate::presence::PresenceView;
use crate::spell;
use crate::target::{self, ResolveOutcome, TargetKind};

use super::context::{CommandContext, CommandOutcome};

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError>;
}

async fn current_player(ctx: &CommandContext<'_>) -> Result<crate::domain::Player, CoreError> {
    ctx.services
        .persistence
        .get_player_by_id(ctx.player_id)
        .await?
        .ok_or(InputError::NotInRoom.into())
}

async fn room_players(
    ctx: &CommandContext<'_>,
    room_id: &str,
) -> Result<Vec<(String, String)>, CoreError> {
    Ok(ctx
        .services
        .persistence
        .get_players_in_room(room_id)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect())
}

async fn resolve_room_target(
    ctx: &CommandContext<'_>,
    room_id: &str,
    target_name: &str,
) -> Result<ResolveOutcome, CoreError> {
    let players = room_players(ctx, room_id).await?;
    let npcs = ctx.services.npc_runtime.get_npcs_in_room(room_id).await;
    Ok(target::resolve(target_name, &players, &npcs)?)
}

pub struct LookHandler;

#[async_trait]
impl Handler for LookHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let player = current_player(ctx).await?;
        let room_id = &player.current_room_id;
        let room = ctx
            .services
            .persistence
            .get_room_by_id(room_id)
            .await?
            .ok_or(InputError::NotInRoom)?;

        if ctx.args.is_empty() {
            let view = PresenceView::new(
                ctx.services.connections.clone(),
                ctx.services.persistence.clone(),
                ctx.services.npc_runtime.clone(),
            );
            let occupants = view.list_occupants(room_id, ctx.player_id).await?;
            return Ok(CommandOutcome::text(look::render_room(&room, &occupants)));
        }

        let target_name = ctx.joined_args();
        match resolve_room_target(ctx, room_id, &target_name).await {
            Ok(ResolveOutcome::Resolved(candidate)) => match candidate.kind {
                TargetKind::Player => {
                    let target_player = ctx
                        .services
                        .persistence
                        .get_player_by_id(&candidate.id)
                        .await?
                        .ok_or(InputError::NoMatch)?;
                    let linkdead = ctx.services.connections.is_in_grace(&candidate.id);
                    Ok(CommandOutcome::text(look::render_player(&target_player, linkdead)))
                }
                TargetKind::Npc => Ok(CommandOutcome::text(format!("You see {}.", candidate.display_name))),
            },
            Ok(ResolveOutcome::DisambiguationRequired(_)) => {
                Err(InputError::DisambiguationRequired.into())
            }
            Err(CoreError::Input(InputError::NoMatch)) => {
                Ok(CommandOutcome::text(format!("You don't see any '{target_name}' here.")))
            }
            Err(other) => Err(other),
        }
    }
}

pub struct SayHandler;

#[async_trait]
impl Handler for SayHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let player = current_player(ctx).await?;
        let message = ctx.joined_args();

        ctx.services
            .connections
            .broadcast_to_room(
                "chat_say_room",
                &player.current_room_id,
                json!({ "from": player.name, "message": message }),
                Some(ctx.player_id),
            )
            .await?;

        Ok(CommandOutcome::text(format!("You say: {message}")))
    }
}

pub struct MoveHandler {
    pub direction: &'static str,
}

#[async_trait]
impl Handler for MoveHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        if ctx.services.combat.is_player_in_combat(ctx.player_id) {
            return Ok(CommandOutcome::text("You can't leave while in combat."));
        }

        let mut player = current_player(ctx).await?;
        let room = ctx
            .services
            .persistence
            .get_room_by_id(&player.current_room_id)
            .await?
            .ok_or(InputError::NotInRoom)?;

        let Some(destination_id) = room.exits.get(self.direction).cloned() else {
            return Ok(CommandOutcome::text("You can't go that way."));
        };

        let origin_id = player.current_room_id.clone();
        player.current_room_id = destination_id.clone();
        ctx.services.persistence.save_player(&player).await?;

        ctx.services
            .connections
            .broadcast_to_room(
                "event_player_left",
                &origin_id,
                json!({ "player_id": ctx.player_id, "direction": self.direction }),
                Some(ctx.player_id),
            )
            .await?;
        ctx.services
            .connections
            .broadcast_to_room(
                "event_player_entered",
                &destination_id,
                json!({ "player_id": ctx.player_id }),
                Some(ctx.player_id),
            )
            .await?;

        self.move_followers(ctx, &origin_id, &destination_id).await?;

        Ok(CommandOutcome::text(format!("You head {}.", self.direction)))
    }
}

impl MoveHandler {
    /// Followers present in the leader's origin room attempt the same
    /// move. A follower in combat, in grace, or missing from persistence is
    /// silently skipped, matching [`crate::follow::FollowCoordinator::followers_in_room`]'s
    /// documented contract.
    async fn move_followers(
        &self,
        ctx: &CommandContext<'_>,
        origin_id: &str,
        destination_id: &str,
    ) -> Result<(), CoreError> {
        let present_ids: Vec<String> = room_players(ctx, origin_id)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let followers = ctx.services.follow.followers_in_room(ctx.player_id, &present_ids);

        for follower_id in followers {
            if ctx.services.combat.is_player_in_combat(&follower_id) {
                continue;
            }
            if ctx.services.connections.is_in_grace(&follower_id) {
                continue;
            }
            let Some(mut follower) = ctx.services.persistence.get_player_by_id(&follower_id).await? else {
                continue;
            };
            follower.current_room_id = destination_id.to_string();
            ctx.services.persistence.save_player(&follower).await?;

            ctx.services
                .connections
                .broadcast_to_room(
                    "event_player_left",
                    origin_id,
                    json!({ "player_id": follower_id, "direction": self.direction }),
                    Some(follower_id.as_str()),
                )
                .await?;
            ctx.services
                .connections
                .broadcast_to_room(
                    "event_player_entered",
                    destination_id,
                    json!({ "player_id": follower_id }),
                    Some(follower_id.as_str()),
                )
                .await?;
        }
        Ok(())
    }
}

pub struct AttackHandler;

#[async_trait]
impl Handler for AttackHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let player = current_player(ctx).await?;
        let room_id = player.current_room_id.clone();
        let target_name = ctx.joined_args();
        if target_name.is_empty() {
            return Err(InputError::NoTarget.into());
        }

        let candidate = match resolve_room_target(ctx, &room_id, &target_name).await? {
            ResolveOutcome::Resolved(c) => c,
            ResolveOutcome::DisambiguationRequired(_) => {
                return Err(InputError::DisambiguationRequired.into())
            }
        };

        if ctx.services.combat.is_player_in_combat(ctx.player_id) {
            let outcome = ctx
                .services
                .combat
                .process_attack(ctx.player_id, &candidate.id, 10)
                .await?;
            return Ok(CommandOutcome::with_data(
                format!("You hit for {} damage.", outcome.damage_dealt),
                json!({ "target_died": outcome.target_died, "combat_ended": outcome.combat_ended }),
            ));
        }

        let attacker = Participant::player(ctx.player_id, player.hit_points, player.max_hit_points, player.dexterity);
        let target = match candidate.kind {
            TargetKind::Npc => {
                let npc = ctx
                    .services
                    .npc_runtime
                    .get_npc_instance(&candidate.id)
                    .await
                    .ok_or(InputError::NoMatch)?;
                Participant::npc(npc.id.clone(), npc.prototype_id.clone(), npc.hit_points, npc.max_hit_points, npc.dexterity)
            }
            TargetKind::Player => {
                let target_player = ctx
                    .services
                    .persistence
                    .get_player_by_id(&candidate.id)
                    .await?
                    .ok_or(InputError::NoMatch)?;
                Participant::player(
                    target_player.id,
                    target_player.hit_points,
                    target_player.max_hit_points,
                    target_player.dexterity,
                )
            }
        };

        ctx.services.combat.start_combat(&room_id, attacker, target).await;
        let outcome = ctx.services.combat.process_attack(ctx.player_id, &candidate.id, 10).await?;

        Ok(CommandOutcome::with_data(
            format!("You attack {} for {} damage.", candidate.display_name, outcome.damage_dealt),
            json!({ "target_died": outcome.target_died, "combat_ended": outcome.combat_ended }),
        ))
    }
}

pub struct FollowHandler;

#[async_trait]
impl Handler for FollowHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let player = current_player(ctx).await?;
        let target_name = ctx.joined_args();
        let candidate = match resolve_room_target(ctx, &player.current_room_id, &target_name).await? {
            ResolveOutcome::Resolved(c) => c,
            ResolveOutcome::DisambiguationRequired(_) => {
                return Err(InputError::DisambiguationRequired.into())
            }
        };

        let leader_kind = match candidate.kind {
            TargetKind::Player => LeaderKind::Player,
            TargetKind::Npc => LeaderKind::Npc,
        };

        let accepted = ctx
            .services
            .follow
            .request(ctx.player_id, &candidate.id, leader_kind, true)?;

        if accepted {
            Ok(CommandOutcome::text(format!("You start following {}.", candidate.display_name)))
        } else {
            Ok(CommandOutcome::text(format!(
                "You ask to follow {}; they must accept.",
                candidate.display_name
            )))
        }
    }
}

pub struct UnfollowHandler;

#[async_trait]
impl Handler for UnfollowHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let previous_leader = ctx.services.follow.unfollow(ctx.player_id)?;
        Ok(CommandOutcome::text(format!("You stop following {previous_leader}.")))
    }
}

pub struct FollowingHandler;

#[async_trait]
impl Handler for FollowingHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let view = ctx.services.follow.following_view(ctx.player_id);
        let leader_line = view
            .leader
            .map(|l| format!("You are following {l}."))
            .unwrap_or_else(|| "You aren't following anyone.".to_string());
        let follower_line = if view.followers.is_empty() {
            "No one is following you.".to_string()
        } else {
            format!("Following you: {}", view.followers.join(", "))
        };
        Ok(CommandOutcome::text(format!("{leader_line}\n{follower_line}")))
    }
}

pub struct CastHandler;

#[async_trait]
impl Handler for CastHandler {
    async fn handle(&self, ctx: &CommandContext<'_>) -> Result<CommandOutcome, CoreError> {
        let spell_id = ctx.arg(0).ok_or(InputError::NoTarget)?.to_ascii_lowercase();
        let definition = spell::lookup(&spell_id).ok_or(InputError::NoMatch)?;

        let caster = current_player(ctx).await?;
        let room_id = caster.current_room_id.clone();
        let target_name = ctx.args[1..].join(" ");

        let mut target = if target_name.is_empty() {
            caster.clone()
        } else {
            let candidate = match resolve_room_target(ctx, &room_id, &target_name).await? {
                ResolveOutcome::Resolved(c) => c,
                ResolveOutcome::DisambiguationRequired(_) => {
                    return Err(InputError::DisambiguationRequired.into())
                }
            };
            if candidate.kind != TargetKind::Player {
                return Err(CoreError::Spell(crate::error::SpellError::InvalidTarget));
            }
            ctx.services
                .persistence
                .get_player_by_id(&candidate.id)
                .await?
                .ok_or(InputError::NoMatch)?
        };

        let outcome = spell::apply(&definition, &mut target)?;
        ctx.services.persistence.save_player(&target).await?;

        Ok(CommandOutcome::text(outcome.message))
    }
}
