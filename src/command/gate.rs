//! Gate stage: reject before a command is even sanitised, when the server
//! is shutting down or the player is in a login grace period and the verb
//! is combat-initiating.

use crate::error::PolicyError;

/// Verbs blocked for a player in login grace — attack-family only; look,
/// say, and movement are allowed.
fn is_combat_initiating(verb: &str) -> bool {
    verb == "attack"
}

pub fn check(verb: &str, shutting_down: bool, in_grace: bool) -> Result<(), PolicyError> {
    if shutting_down {
        return Err(PolicyError::ShutdownPending);
    }
    if in_grace && is_combat_initiating(verb) {
        return Err(PolicyError::GracePeriodBlocked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_everything_during_shutdown() {
        assert_eq!(check("look", true, false).unwrap_err(), PolicyError::ShutdownPending);
    }

    #[test]
    fn grace_blocks_only_combat() {
        assert_eq!(check("attack", false, true).unwrap_err(), PolicyError::GracePeriodBlocked);
        assert!(check("look", false, true).is_ok());
        assert!(check("say", false, true).is_ok());
        assert!(check("go_north", false, true).is_ok());
    }

    #[test]
    fn normal_play_is_unblocked() {
        assert!(check("attack", false, false).is_ok());
    }
}
