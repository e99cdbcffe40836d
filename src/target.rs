//! Target resolution (C6): turn a text target into exactly one entity in
//! the requester's room.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::NpcInstance;
use crate::error::InputError;

static SUFFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+)-(\d+)$").unwrap());

/// Strip characters that aren't letters, digits, or spaces, for
/// punctuation-insensitive NPC name comparisons.
fn without_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Player,
    Npc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: TargetKind,
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved(Candidate),
    DisambiguationRequired(Vec<(Candidate, u32)>),
}

struct Normalised {
    base: String,
    suffix: Option<u32>,
}

fn normalise(target: &str) -> Normalised {
    let trimmed = target.trim().to_lowercase();
    if let Some(caps) = SUFFIX_PATTERN.captures(&trimmed) {
        if let Ok(suffix) = caps[2].parse::<u32>() {
            return Normalised {
                base: caps[1].to_string(),
                suffix: Some(suffix),
            };
        }
    }
    Normalised {
        base: trimmed,
        suffix: None,
    }
}

/// Resolve `target` against the room's players and NPCs.
///
/// `players` is `(player_id, display_name)` pairs already filtered to the
/// requester's room by the caller (self-targeting included unless the
/// caller excludes it beforehand).
pub fn resolve(
    target: &str,
    players: &[(String, String)],
    npcs: &[NpcInstance],
) -> Result<ResolveOutcome, InputError> {
    let normalised = normalise(target);
    let base_no_punct = without_punctuation(&normalised.base);

    let mut candidates: Vec<Candidate> = Vec::new();
    for (id, name) in players {
        if name.to_lowercase().contains(&normalised.base) {
            candidates.push(Candidate {
                kind: TargetKind::Player,
                id: id.clone(),
                display_name: name.clone(),
            });
        }
    }
    for npc in npcs {
        let npc_name = npc.name_without_punctuation().to_lowercase();
        if npc_name.contains(&base_no_punct.to_lowercase()) {
            candidates.push(Candidate {
                kind: TargetKind::Npc,
                id: npc.id.clone(),
                display_name: npc.name.clone(),
            });
        }
    }

    if candidates.is_empty() {
        return Err(InputError::NoMatch);
    }

    if candidates.len() == 1 {
        return Ok(ResolveOutcome::Resolved(candidates.into_iter().next().unwrap()));
    }

    // Assign stable per-name suffixes in enumeration order.
    let mut seen_counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
    let annotated: Vec<(Candidate, u32)> = candidates
        .into_iter()
        .map(|c| {
            let count = seen_counts.entry(c.display_name.to_lowercase()).or_insert(0);
            *count += 1;
            (c, *count)
        })
        .collect();

    match normalised.suffix {
        None => Ok(ResolveOutcome::DisambiguationRequired(annotated)),
        Some(wanted) => annotated
            .into_iter()
            .find(|(_, suffix)| *suffix == wanted)
            .map(|(c, _)| ResolveOutcome::Resolved(c))
            .ok_or(InputError::NoMatch),
    }
}
