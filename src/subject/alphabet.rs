//! Alphabet validation for substituted placeholder values and subject
//! tokens, grounded in the original `SubjectValidator`'s lenient/strict
//! regexes.

use regex::Regex;
use std::sync::LazyLock;

/// `[A-Za-z0-9_-]+` — the default alphabet, allowing underscores.
static LENIENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// `[A-Za-z0-9-]+` — no underscores, used when `subject.strict_alphabet` is set.
static STRICT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());

/// Returns true if `token` is legal under the given alphabet.
pub fn is_legal_token(token: &str, strict: bool) -> bool {
    if token.is_empty() {
        return false;
    }
    if strict {
        STRICT.is_match(token)
    } else {
        LENIENT.is_match(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_allows_underscore() {
        assert!(is_legal_token("room_1", false));
        assert!(!is_legal_token("room_1", true));
    }

    #[test]
    fn rejects_empty_and_dotted() {
        assert!(!is_legal_token("", false));
        assert!(!is_legal_token("a.b", false));
    }

    #[test]
    fn rejects_non_ascii_symbols() {
        assert!(!is_legal_token("room!", false));
        assert!(!is_legal_token("room!", true));
    }
}
