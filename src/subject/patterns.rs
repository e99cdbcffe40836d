//! Built-in subject pattern table.
//!
//! Covers every subject named verbatim in SPEC_FULL.md §6's bit-exact
//! vocabulary list, plus the supplementary patterns present in the original
//! source's full pattern table (`event_player_mortally_wounded`,
//! `event_player_dp_decay`, `event_domain`, `combat_npc_attacked`,
//! `combat_npc_action`) that the distilled spec dropped but which enrich a
//! complete implementation.

use super::types::SubjectPattern;

pub fn builtin_patterns() -> Vec<SubjectPattern> {
    let p = |name: &str, template: &str, required: &[&str], desc: &str| {
        SubjectPattern::new(
            name,
            template,
            required.iter().map(|s| s.to_string()).collect(),
            desc,
        )
    };

    vec![
        // Chat
        p("chat_say_room", "chat.say.room.{room_id}", &["room_id"], "Room-level say messages"),
        p(
            "chat_local_subzone",
            "chat.local.subzone.{subzone}",
            &["subzone"],
            "Subzone-level local messages",
        ),
        p("chat_global", "chat.global", &[], "Global chat messages"),
        p(
            "chat_whisper_player",
            "chat.whisper.player.{target_id}",
            &["target_id"],
            "Player-to-player whisper messages",
        ),
        p("chat_system", "chat.system", &[], "System-wide messages"),
        p(
            "chat_emote_room",
            "chat.emote.room.{room_id}",
            &["room_id"],
            "Room-level emote messages",
        ),
        p(
            "chat_pose_room",
            "chat.pose.room.{room_id}",
            &["room_id"],
            "Room-level pose messages",
        ),
        p(
            "chat_party_group",
            "chat.party.group.{party_id}",
            &["party_id"],
            "Party (ephemeral group) chat messages",
        ),
        // Events
        p(
            "event_player_entered",
            "events.player_entered.{room_id}",
            &["room_id"],
            "Player entered room events",
        ),
        p(
            "event_player_left",
            "events.player_left.{room_id}",
            &["room_id"],
            "Player left room events",
        ),
        p("event_game_tick", "events.game_tick", &[], "Global game tick events"),
        p(
            "event_player_mortally_wounded",
            "events.player_mortally_wounded.{room_id}",
            &["room_id"],
            "Player mortally wounded events",
        ),
        p(
            "event_player_dp_decay",
            "events.player_dp_decay.{player_id}",
            &["player_id"],
            "Player DP decay events",
        ),
        p(
            "event_player_died",
            "events.player_died.{room_id}",
            &["room_id"],
            "Player death events",
        ),
        p(
            "event_player_respawned",
            "events.player_respawned.{room_id}",
            &["room_id"],
            "Player respawn events",
        ),
        p(
            "event_domain",
            "events.domain.{domain}",
            &["domain"],
            "Distributed event-bus domain events",
        ),
        // Combat
        p("combat_attack", "combat.attack.{room_id}", &["room_id"], "Combat attack events"),
        p(
            "combat_npc_attacked",
            "combat.npc_attacked.{room_id}",
            &["room_id"],
            "NPC attacked events",
        ),
        p(
            "combat_npc_action",
            "combat.npc_action.{room_id}",
            &["room_id"],
            "NPC action events",
        ),
        p("combat_started", "combat.started.{room_id}", &["room_id"], "Combat started events"),
        p("combat_ended", "combat.ended.{room_id}", &["room_id"], "Combat ended events"),
        p(
            "combat_npc_died",
            "combat.npc_died.{room_id}",
            &["room_id"],
            "NPC death events",
        ),
        p("combat_damage", "combat.damage.{room_id}", &["room_id"], "Combat damage events"),
        p("combat_turn", "combat.turn.{room_id}", &["room_id"], "Combat turn events"),
        p(
            "combat_timeout",
            "combat.timeout.{room_id}",
            &["room_id"],
            "Combat timeout events",
        ),
        p(
            "combat_dp_update",
            "combat.dp_update.{player_id}",
            &["player_id"],
            "Player DP (experience/health) update events",
        ),
    ]
}
