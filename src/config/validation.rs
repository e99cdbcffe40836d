//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early, the way
//! the teacher validates server name/SID/TLS paths before accepting a
//! config: deserialise first (serde enforces shape and types), then run
//! cross-field and range checks here.

use thiserror::Error;

use super::Config;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("subject.max_length must be greater than zero")]
    SubjectMaxLengthZero,
    #[error("connection.rate_limit_attempts must be greater than zero")]
    ConnectionRateLimitZero,
    #[error("connection.rate_limit_window_seconds must be greater than zero")]
    ConnectionRateLimitWindowZero,
    #[error("grace.timeout_seconds must be greater than zero")]
    GraceTimeoutZero,
    #[error("pending.queue_capacity must be greater than zero")]
    PendingQueueCapacityZero,
    #[error("combat.turn_timeout_seconds must be greater than zero")]
    CombatTurnTimeoutZero,
    #[error("combat.idle_cleanup_seconds must be greater than zero")]
    CombatIdleCleanupZero,
    #[error("command.max_length must be greater than zero")]
    CommandMaxLengthZero,
    #[error("auth.token_lifetime_seconds must be greater than zero")]
    AuthTokenLifetimeZero,
    #[error("auth.rate_limit_attempts must be greater than zero")]
    AuthRateLimitZero,
    #[error("auth.rate_limit_window_seconds must be greater than zero")]
    AuthRateLimitWindowZero,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.subject.max_length == 0 {
        errors.push(ValidationError::SubjectMaxLengthZero);
    }
    if config.connection.rate_limit_attempts == 0 {
        errors.push(ValidationError::ConnectionRateLimitZero);
    }
    if config.connection.rate_limit_window_seconds == 0 {
        errors.push(ValidationError::ConnectionRateLimitWindowZero);
    }
    if config.grace.timeout_seconds == 0 {
        errors.push(ValidationError::GraceTimeoutZero);
    }
    if config.pending.queue_capacity == 0 {
        errors.push(ValidationError::PendingQueueCapacityZero);
    }
    if config.combat.turn_timeout_seconds == 0 {
        errors.push(ValidationError::CombatTurnTimeoutZero);
    }
    if config.combat.idle_cleanup_seconds == 0 {
        errors.push(ValidationError::CombatIdleCleanupZero);
    }
    if config.command.max_length == 0 {
        errors.push(ValidationError::CommandMaxLengthZero);
    }
    if config.auth.token_lifetime_seconds == 0 {
        errors.push(ValidationError::AuthTokenLifetimeZero);
    }
    if config.auth.rate_limit_attempts == 0 {
        errors.push(ValidationError::AuthRateLimitZero);
    }
    if config.auth.rate_limit_window_seconds == 0 {
        errors.push(ValidationError::AuthRateLimitWindowZero);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn zero_command_max_length_fails() {
        let mut config = Config::default();
        config.command.max_length = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::CommandMaxLengthZero)));
    }

    #[test]
    fn zero_grace_timeout_fails() {
        let mut config = Config::default();
        config.grace.timeout_seconds = 0;
        let errors = validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::GraceTimeoutZero)));
    }

    #[test]
    fn toml_round_trip_with_partial_overrides() {
        let toml = r#"
[subject]
strict_alphabet = true

[combat]
turn_timeout_seconds = 45
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.subject.strict_alphabet);
        assert_eq!(config.combat.turn_timeout_seconds, 45);
        assert_eq!(config.combat.idle_cleanup_seconds, 1800);
        assert!(validate(&config).is_ok());
    }
}
