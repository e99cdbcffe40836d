//! Look engine (C7): renders what a player sees for every look variant.

use crate::domain::{Container, EquipmentSlot, Item, NpcInstance, Player, Room};
use crate::error::InputError;
use crate::presence::RoomOccupants;

pub fn health_label(fraction: f64) -> &'static str {
    if fraction > 0.75 {
        "healthy"
    } else if fraction >= 0.25 {
        "wounded"
    } else if fraction > 0.0 {
        "critical"
    } else {
        "mortally wounded"
    }
}

pub fn lucidity_label(fraction: f64) -> &'static str {
    if fraction > 0.75 {
        "lucid"
    } else if fraction >= 0.25 {
        "disturbed"
    } else if fraction > 0.0 {
        "unstable"
    } else {
        "mad"
    }
}

/// Select the N-th match (1-indexed) from `candidates`, honoring a
/// trailing `-N` or space-separated `N` in `raw_target`. With no instance
/// selector and exactly one candidate, returns it directly.
pub fn select_instance<'a, T>(
    raw_target: &str,
    candidates: &'a [T],
) -> Result<&'a T, InputError> {
    let trimmed = raw_target.trim();
    let instance: Option<usize> = trimmed
        .rsplit_once('-')
        .and_then(|(_, n)| n.parse::<usize>().ok())
        .or_else(|| trimmed.rsplit_once(' ').and_then(|(_, n)| n.parse::<usize>().ok()));

    match instance {
        Some(n) if n >= 1 => candidates.get(n - 1).ok_or(InputError::NoMatch),
        _ => {
            if candidates.is_empty() {
                Err(InputError::NoMatch)
            } else {
                Ok(&candidates[0])
            }
        }
    }
}

/// Default room view: name, description, drops, containers, NPCs, other
/// players, exits. Empty sections are omitted entirely.
pub fn render_room(room: &Room, occupants: &RoomOccupants) -> String {
    let mut lines = vec![room.name.clone(), room.description.clone()];

    if !room.drops.is_empty() {
        let names: Vec<&str> = room.drops.iter().map(|i| i.name.as_str()).collect();
        lines.push(format!("On the ground: {}", names.join(", ")));
    }

    if !occupants.containers.is_empty() {
        let names: Vec<&str> = occupants.containers.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("Containers: {}", names.join(", ")));
    }

    if !occupants.npcs.is_empty() {
        let names: Vec<&str> = occupants.npcs.iter().map(|n| n.name.as_str()).collect();
        lines.push(format!("Also here: {}", names.join(", ")));
    }

    if !occupants.players.is_empty() {
        let names: Vec<String> = occupants.players.iter().map(|p| p.display()).collect();
        lines.push(format!("Players: {}", names.join(", ")));
    }

    if !room.exits.is_empty() {
        let mut directions: Vec<&str> = room.exits.keys().map(String::as_str).collect();
        directions.sort();
        lines.push(format!("Exits: {}", directions.join(", ")));
    }

    lines.join("\n")
}

pub fn render_direction(destination: Option<&Room>) -> String {
    match destination {
        Some(room) => format!("{}\n{}", room.name, room.description),
        None => "There's nothing special that way.".to_string(),
    }
}

pub fn render_player(player: &Player, linkdead: bool) -> String {
    let name = if linkdead {
        format!("{} (linkdead)", player.name)
    } else {
        player.name.clone()
    };

    let mut equipped: Vec<String> = EquipmentSlot::visible_slots()
        .iter()
        .filter_map(|slot| player.equipment.get(slot).map(|item| item.name.clone()))
        .collect();
    equipped.sort();

    let mut lines = vec![name];
    if !equipped.is_empty() {
        lines.push(format!("Wearing: {}", equipped.join(", ")));
    }
    lines.push(format!(
        "Health: {} ({}/{})",
        health_label(player.health_fraction()),
        player.hit_points,
        player.max_hit_points
    ));
    lines.push(format!(
        "Lucidity: {} ({}/{})",
        lucidity_label(player.lucidity_fraction()),
        player.lucidity,
        player.max_lucidity
    ));
    lines.join("\n")
}

/// Search order for item look: room drops, then inventory, then equipped
/// (equipped skipped when `skip_equipped` is set, i.e. "look in <x>").
pub fn find_item<'a>(
    name: &str,
    drops: &'a [Item],
    inventory: &'a [Item],
    equipped: &'a [Item],
    skip_equipped: bool,
) -> Option<&'a Item> {
    let needle = name.to_lowercase();
    let matches = |item: &&Item| item.name.to_lowercase().contains(&needle);

    if let Some(item) = drops.iter().find(matches) {
        return Some(item);
    }
    if let Some(item) = inventory.iter().find(matches) {
        return Some(item);
    }
    if !skip_equipped {
        if let Some(item) = equipped.iter().find(matches) {
            return Some(item);
        }
    }
    None
}

pub fn render_item(item: &Item) -> String {
    format!("{}\n{}", item.name, item.long_description)
}

pub fn find_container<'a>(name_or_id: &'a str, room_containers: &'a [Container], equipped: &'a [Container]) -> Option<&'a Container> {
    let needle = name_or_id.to_lowercase();
    room_containers
        .iter()
        .chain(equipped.iter())
        .find(|c| c.id == name_or_id || c.name.to_lowercase().contains(&needle))
}

pub fn render_container(container: &Container, show_contents: bool) -> String {
    let lock_state = if container.locked { "locked" } else { "unlocked" };
    let mut lines = vec![
        container.name.clone(),
        format!("{} ({}/{} slots)", lock_state, container.used_slots(), container.capacity),
    ];
    if show_contents && !container.locked {
        if container.contents.is_empty() {
            lines.push("It's empty.".to_string());
        } else {
            let names: Vec<&str> = container.contents.iter().map(|i| i.name.as_str()).collect();
            lines.push(format!("Contains: {}", names.join(", ")));
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplicitMatch {
    Player(String),
    Npc(String),
    Item(String),
    Container(String),
}

/// Implicit look resolution order: player, NPC, item, container.
pub fn resolve_implicit(
    name: &str,
    players: &[(String, String)],
    npcs: &[NpcInstance],
    items: &[Item],
    containers: &[Container],
) -> Option<ImplicitMatch> {
    let needle = name.to_lowercase();
    if let Some((id, _)) = players.iter().find(|(_, n)| n.to_lowercase().contains(&needle)) {
        return Some(ImplicitMatch::Player(id.clone()));
    }
    if let Some(npc) = npcs.iter().find(|n| n.name.to_lowercase().contains(&needle)) {
        return Some(ImplicitMatch::Npc(npc.id.clone()));
    }
    if let Some(item) = items.iter().find(|i| i.name.to_lowercase().contains(&needle)) {
        return Some(ImplicitMatch::Item(item.id.clone()));
    }
    if let Some(container) = containers.iter().find(|c| c.name.to_lowercase().contains(&needle)) {
        return Some(ImplicitMatch::Container(container.id.clone()));
    }
    None
}
