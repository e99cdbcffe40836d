//! Wildcard subscription matching: does a concrete subject fall under a
//! subscription pattern produced by [`crate::subject::SubjectRegistry::subscription_pattern`]?
//!
//! Distinct from [`crate::subject::matches_pattern`]: that validates
//! addressing against a registered template; this validates fan-out against
//! a subscriber's wildcard pattern. `*` matches exactly one token; `>`
//! matches the remainder of the subject regardless of length and must be
//! the pattern's last token.

/// True if `subject`, tokenised on `.`, matches `pattern`, tokenised on `.`.
pub fn subscription_matches(pattern: &str, subject: &str) -> bool {
    let pattern_tokens: Vec<&str> = pattern.split('.').collect();
    let subject_tokens: Vec<&str> = subject.split('.').collect();

    for (i, pattern_token) in pattern_tokens.iter().enumerate() {
        if *pattern_token == ">" {
            return i < subject_tokens.len() || i == subject_tokens.len();
        }
        let Some(subject_token) = subject_tokens.get(i) else {
            return false;
        };
        if *pattern_token != "*" && pattern_token != subject_token {
            return false;
        }
    }

    pattern_tokens.len() == subject_tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(subscription_matches("chat.say.room.arkham_1", "chat.say.room.arkham_1"));
    }

    #[test]
    fn single_star_matches_one_token() {
        assert!(subscription_matches("chat.say.room.*", "chat.say.room.arkham_1"));
        assert!(!subscription_matches("chat.say.room.*", "chat.say.room"));
        assert!(!subscription_matches(
            "chat.say.room.*",
            "chat.say.room.arkham_1.extra"
        ));
    }

    #[test]
    fn tail_wildcard_matches_any_remaining_length() {
        assert!(subscription_matches("events.>", "events.player_entered.arkham_1"));
        assert!(subscription_matches("events.>", "events.game_tick"));
        assert!(subscription_matches("events.>", "events"));
        assert!(!subscription_matches("events.>", "chat.global"));
    }

    #[test]
    fn mismatched_literal_fails() {
        assert!(!subscription_matches("chat.say.room.*", "chat.emote.room.arkham_1"));
    }
}
