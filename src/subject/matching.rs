//! Registry-side subject matching: does a concrete subject's tokens line up
//! against a pattern's literal-or-placeholder tokens? This is distinct from
//! the broker's wildcard subscription matching in [`crate::broker::matching`]
//! — this one validates addressing, that one validates fan-out.

use super::alphabet::is_legal_token;
use super::types::SubjectPattern;

/// True if `subject`'s tokens match `pattern`'s template token-for-token:
/// literal tokens must be byte-equal, placeholder tokens (`{name}`) must be
/// present and alphabet-legal.
pub fn matches_pattern(subject: &str, pattern: &SubjectPattern, strict_alphabet: bool) -> bool {
    let subject_tokens: Vec<&str> = subject.split('.').collect();
    let pattern_tokens = pattern.tokens();

    if subject_tokens.len() != pattern_tokens.len() {
        return false;
    }

    for (subject_token, pattern_token) in subject_tokens.iter().zip(pattern_tokens.iter()) {
        if is_placeholder(pattern_token) {
            if !is_legal_token(subject_token, strict_alphabet) {
                return false;
            }
        } else if subject_token != pattern_token {
            return false;
        }
    }

    true
}

pub fn is_placeholder(token: &str) -> bool {
    token.starts_with('{') && token.ends_with('}') && token.len() > 2
}

pub fn placeholder_name(token: &str) -> Option<&str> {
    if is_placeholder(token) {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> SubjectPattern {
        SubjectPattern::new(
            "chat_say_room",
            "chat.say.room.{room_id}",
            vec!["room_id".to_string()],
            "",
        )
    }

    #[test]
    fn matches_concrete_subject() {
        assert!(matches_pattern("chat.say.room.arkham_1", &pattern(), false));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!matches_pattern("chat.say.room", &pattern(), false));
        assert!(!matches_pattern("chat.say.room.arkham_1.extra", &pattern(), false));
    }

    #[test]
    fn rejects_illegal_placeholder_value_under_strict_alphabet() {
        assert!(matches_pattern("chat.say.room.arkham_1", &pattern(), false));
        assert!(!matches_pattern("chat.say.room.arkham_1", &pattern(), true));
    }

    #[test]
    fn rejects_literal_mismatch() {
        assert!(!matches_pattern("chat.say.channel.arkham_1", &pattern(), false));
    }
}
