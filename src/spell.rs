//! Spell/effect dispatch (C10): applies a resolved effect to a resolved
//! target via the player service.

use serde::{Deserialize, Serialize};

use crate::domain::Player;
use crate::error::SpellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Heal,
    Damage,
    StatusEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectData {
    pub amount: i64,
    pub damage_reduction: i64,
    pub status_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpellDefinition {
    pub spell_id: String,
    pub effect_kind: EffectKind,
    pub effect_data: EffectData,
    pub mastery: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellOutcome {
    pub success: bool,
    pub message: String,
    pub effect_applied: bool,
}

/// Status effect duration scales with caster mastery: one tick per 10
/// points, minimum one tick.
fn status_duration_ticks(mastery: u32) -> u32 {
    (mastery / 10).max(1)
}

/// Built-in spell catalogue, keyed by the name a player types after `cast`.
/// A real deployment would source these from a spell repository; this is
/// the fixed set the bare binary ships with.
pub fn lookup(spell_id: &str) -> Option<SpellDefinition> {
    let def = match spell_id {
        "heal" => SpellDefinition {
            spell_id: "heal".to_string(),
            effect_kind: EffectKind::Heal,
            effect_data: EffectData {
                amount: 15,
                damage_reduction: 0,
                status_name: None,
            },
            mastery: 10,
        },
        "firebolt" => SpellDefinition {
            spell_id: "firebolt".to_string(),
            effect_kind: EffectKind::Damage,
            effect_data: EffectData {
                amount: 12,
                damage_reduction: 0,
                status_name: None,
            },
            mastery: 10,
        },
        "curse" => SpellDefinition {
            spell_id: "curse".to_string(),
            effect_kind: EffectKind::StatusEffect,
            effect_data: EffectData {
                amount: 0,
                damage_reduction: 0,
                status_name: Some("cursed".to_string()),
            },
            mastery: 10,
        },
        _ => return None,
    };
    Some(def)
}

/// Apply `spell` to `target`, mutating it in place. The target must already
/// be resolved by the caller (C6); this dispatcher only validates the
/// effect kind and applies the numeric mutation.
pub fn apply(spell: &SpellDefinition, target: &mut Player) -> Result<SpellOutcome, SpellError> {
    if !target.is_alive() && spell.effect_kind != EffectKind::Heal {
        return Err(SpellError::InvalidTarget);
    }

    match spell.effect_kind {
        EffectKind::Heal => {
            let healed = spell.effect_data.amount.max(0);
            target.hit_points = (target.hit_points + healed).min(target.max_hit_points);
            Ok(SpellOutcome {
                success: true,
                message: format!("{} is healed.", target.name),
                effect_applied: true,
            })
        }
        EffectKind::Damage => {
            let reduced = (spell.effect_data.amount - spell.effect_data.damage_reduction).max(0);
            target.hit_points -= reduced;
            Ok(SpellOutcome {
                success: true,
                message: format!("{} takes {} damage.", target.name, reduced),
                effect_applied: true,
            })
        }
        EffectKind::StatusEffect => {
            let ticks = status_duration_ticks(spell.mastery);
            let name = spell.effect_data.status_name.clone().unwrap_or_else(|| "an effect".to_string());
            Ok(SpellOutcome {
                success: true,
                message: format!("{} is afflicted with {name} for {ticks} ticks.", target.name),
                effect_applied: true,
            })
        }
    }
}
