//! Sanitise stage: strip control characters, collapse whitespace, enforce
//! the configured maximum length, and reject structurally dangerous
//! substrings. Unicode text itself is preserved — only shell metacharacters,
//! SQL-injection and script-injection signatures, and format specifiers are
//! rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::InputError;

const SHELL_METACHARACTERS: &[char] = &[';', '|', '&'];

static SQL_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(--|;|'|\bunion\b|\bselect\b|\bdrop\b|\binsert\b|\bdelete\b)").unwrap()
});

static SCRIPT_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(<script|javascript:|onerror=|onload=)").unwrap()
});

static FORMAT_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[sdx%n]").unwrap());

/// Strip control characters and collapse runs of whitespace into single
/// spaces, trimming the ends.
fn normalise_whitespace(line: &str) -> String {
    let stripped: String = line.chars().filter(|c| !c.is_control() || *c == ' ').collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate and normalise a raw input line. Returns the sanitised line or
/// a typed rejection.
pub fn sanitise(raw: &str, max_length: usize) -> Result<String, InputError> {
    let normalised = normalise_whitespace(raw);

    if normalised.len() > max_length {
        return Err(InputError::CommandTooLong);
    }

    if normalised.contains(SHELL_METACHARACTERS) {
        return Err(InputError::InvalidCharacters);
    }
    if SQL_SIGNATURE.is_match(&normalised) {
        return Err(InputError::InvalidCharacters);
    }
    if SCRIPT_SIGNATURE.is_match(&normalised) {
        return Err(InputError::InvalidCharacters);
    }
    if FORMAT_SPECIFIER.is_match(&normalised) {
        return Err(InputError::InvalidCharacters);
    }

    Ok(normalised)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(sanitise("  say   hello   there  ", 50).unwrap(), "say hello there");
    }

    #[test]
    fn rejects_over_length() {
        let long = "a".repeat(51);
        assert_eq!(sanitise(&long, 50).unwrap_err(), InputError::CommandTooLong);
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert_eq!(
            sanitise("say hi; rm -rf /", 50).unwrap_err(),
            InputError::InvalidCharacters
        );
    }

    #[test]
    fn rejects_sql_signature() {
        assert_eq!(
            sanitise("say '; DROP TABLE players; --", 50).unwrap_err(),
            InputError::InvalidCharacters
        );
    }

    #[test]
    fn rejects_script_signature() {
        assert_eq!(
            sanitise("say <script>alert(1)</script>", 50).unwrap_err(),
            InputError::InvalidCharacters
        );
    }

    #[test]
    fn preserves_unicode_text() {
        assert_eq!(sanitise("say ü ß 日本語", 50).unwrap(), "say ü ß 日本語");
    }
}
