//! Verb alias resolution.
//!
//! The attack-family alias set is the original handler's full list
//! (`punch`, `kick`, `strike`, `hit`, `smack`, `thump`) plus `attack`
//! itself — a deliberately wide supplement over the distilled spec's
//! `punch`/`kick`/`strike` trio.

/// Resolve `verb` (already lowercased) to its canonical handler name.
pub fn resolve(verb: &str) -> &str {
    match verb {
        "attack" | "punch" | "kick" | "strike" | "hit" | "smack" | "thump" => "attack",
        "l" => "look",
        "n" | "north" => "go_north",
        "s" | "south" => "go_south",
        "e" | "east" => "go_east",
        "w" | "west" => "go_west",
        "u" | "up" => "go_up",
        "d" | "down" => "go_down",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_synonyms_resolve_to_attack() {
        for synonym in ["punch", "kick", "strike", "hit", "smack", "thump", "attack"] {
            assert_eq!(resolve(synonym), "attack");
        }
    }

    #[test]
    fn movement_shorthand_resolves() {
        assert_eq!(resolve("n"), "go_north");
        assert_eq!(resolve("north"), "go_north");
    }

    #[test]
    fn unknown_verb_passes_through() {
        assert_eq!(resolve("dance"), "dance");
    }
}
