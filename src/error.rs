//! Unified error handling for the core.
//!
//! One `thiserror`-derived enum per concern, mirroring §7's categories.
//! Every variant carries a stable `error_code()` for metrics labelling and a
//! short canonical message safe to show a client — no internal detail, no
//! other player's identifiers, no stack frames.

use thiserror::Error;

/// Errors produced while building, validating, or registering subjects (C1).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("no pattern registered with name '{0}'")]
    PatternNotFound(String),

    #[error("missing required parameter(s) for '{pattern}': {missing:?}")]
    MissingParameter {
        pattern: String,
        missing: Vec<String>,
    },

    #[error("pattern template is invalid: {0}")]
    InvalidPattern(String),

    #[error("value for parameter '{0}' is not legal under the active alphabet")]
    InvalidValue(String),

    #[error("subject exceeds maximum length")]
    SubjectTooLong,
}

impl SubjectError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PatternNotFound(_) => "pattern_not_found",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::InvalidPattern(_) => "invalid_pattern",
            Self::InvalidValue(_) => "invalid_value",
            Self::SubjectTooLong => "subject_too_long",
        }
    }
}

/// Errors produced while sanitising, parsing, or resolving targets for a
/// command line (C5, C6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("command line exceeds the maximum length")]
    CommandTooLong,

    #[error("command line contains disallowed characters")]
    InvalidCharacters,

    #[error("no target specified")]
    NoTarget,

    #[error("no target matches that name here")]
    NoMatch,

    #[error("multiple targets match; be more specific")]
    DisambiguationRequired,

    #[error("you are not in a room")]
    NotInRoom,
}

impl InputError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CommandTooLong => "command_too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::NoTarget => "no_target",
            Self::NoMatch => "no_match",
            Self::DisambiguationRequired => "disambiguation_required",
            Self::NotInRoom => "not_in_room",
        }
    }

    /// Canonical, client-safe text for this error.
    pub fn to_reply(&self) -> String {
        match self {
            Self::CommandTooLong => "That command is too long.".to_string(),
            Self::InvalidCharacters => "That command contains characters that aren't allowed.".to_string(),
            Self::NoTarget => "You'll need to specify a target.".to_string(),
            Self::NoMatch => "You don't see that here.".to_string(),
            Self::DisambiguationRequired => {
                "Multiple things match that name; be more specific.".to_string()
            }
            Self::NotInRoom => "You aren't anywhere right now.".to_string(),
        }
    }
}

/// Authentication and policy errors (C3, C11, C5's gate stage).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("rate limited")]
    RateLimited,

    #[error("server is shutting down")]
    ShutdownPending,

    #[error("blocked during login grace period")]
    GracePeriodBlocked,
}

impl PolicyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::ShutdownPending => "shutdown_pending",
            Self::GracePeriodBlocked => "grace_period_blocked",
        }
    }

    pub fn to_reply(&self) -> String {
        match self {
            Self::Unauthenticated => "You need to log in first.".to_string(),
            Self::Forbidden => "You can't do that.".to_string(),
            Self::RateLimited => "Slow down.".to_string(),
            Self::ShutdownPending => "The server is shutting down.".to_string(),
            Self::GracePeriodBlocked => "You can't do that while reconnecting.".to_string(),
        }
    }
}

/// Combat engine errors (C8).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("not in combat")]
    NotInCombat,

    #[error("not your turn")]
    NotYourTurn,

    #[error("target is not a participant in this combat")]
    TargetNotParticipant,

    #[error("combat has already ended")]
    CombatEnded,
}

impl CombatError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotInCombat => "not_in_combat",
            Self::NotYourTurn => "not_your_turn",
            Self::TargetNotParticipant => "target_not_participant",
            Self::CombatEnded => "combat_ended",
        }
    }

    pub fn to_reply(&self) -> String {
        match self {
            Self::NotInCombat => "You aren't in combat.".to_string(),
            Self::NotYourTurn => "It isn't your turn.".to_string(),
            Self::TargetNotParticipant => "That target isn't part of this fight.".to_string(),
            Self::CombatEnded => "That combat has already ended.".to_string(),
        }
    }
}

/// Follow/party coordination errors (C9).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FollowError {
    #[error("you can't follow yourself")]
    SelfFollow,

    #[error("leader is not in this room")]
    LeaderNotInRoom,

    #[error("you aren't following anyone")]
    NotFollowing,

    #[error("that request has already been resolved")]
    RequestNotPending,
}

impl FollowError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SelfFollow => "self_follow",
            Self::LeaderNotInRoom => "leader_not_in_room",
            Self::NotFollowing => "not_following",
            Self::RequestNotPending => "request_not_pending",
        }
    }

    pub fn to_reply(&self) -> String {
        match self {
            Self::SelfFollow => "You can't follow yourself.".to_string(),
            Self::LeaderNotInRoom => "They aren't here.".to_string(),
            Self::NotFollowing => "You aren't following anyone.".to_string(),
            Self::RequestNotPending => "That request isn't pending anymore.".to_string(),
        }
    }
}

/// Spell/effect dispatch errors (C10).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpellError {
    #[error("invalid target for this effect")]
    InvalidTarget,

    #[error("unknown effect kind")]
    UnknownEffectKind,
}

impl SpellError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_target",
            Self::UnknownEffectKind => "unknown_effect_kind",
        }
    }

    pub fn to_reply(&self) -> String {
        match self {
            Self::InvalidTarget => "That isn't a valid target.".to_string(),
            Self::UnknownEffectKind => "That effect doesn't exist.".to_string(),
        }
    }
}

/// Failures reaching external collaborators (persistence, optional bus).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("external bus failure: {0}")]
    BusFailure(String),
}

impl ExternalError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::BusFailure(_) => "bus_failure",
        }
    }
}

/// Top-level error composing every concern, used at the edges (command
/// pipeline, HTTP admin surface) where a single type is convenient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Follow(#[from] FollowError),
    #[error(transparent)]
    Spell(#[from] SpellError),
    #[error(transparent)]
    External(#[from] ExternalError),
}

impl CoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Subject(e) => e.error_code(),
            Self::Input(e) => e.error_code(),
            Self::Policy(e) => e.error_code(),
            Self::Combat(e) => e.error_code(),
            Self::Follow(e) => e.error_code(),
            Self::Spell(e) => e.error_code(),
            Self::External(e) => e.error_code(),
        }
    }

    /// Canonical client-facing text. Internal/external failures never leak
    /// detail; the client only ever sees a short apology and a request id.
    pub fn to_reply(&self, request_id: &str) -> String {
        match self {
            Self::Subject(_) => format!("Something went wrong (ref {request_id})."),
            Self::Input(e) => e.to_reply(),
            Self::Policy(e) => e.to_reply(),
            Self::Combat(e) => e.to_reply(),
            Self::Follow(e) => e.to_reply(),
            Self::Spell(e) => e.to_reply(),
            Self::External(_) => format!("Something went wrong (ref {request_id})."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(InputError::CommandTooLong.error_code(), "command_too_long");
        assert_eq!(PolicyError::RateLimited.error_code(), "rate_limited");
        assert_eq!(CombatError::NotYourTurn.error_code(), "not_your_turn");
        assert_eq!(
            SubjectError::SubjectTooLong.error_code(),
            "subject_too_long"
        );
        assert_eq!(
            ExternalError::PersistenceFailure("x".into()).error_code(),
            "persistence_failure"
        );
    }

    #[test]
    fn core_error_never_leaks_detail_for_external_failures() {
        let err: CoreError = ExternalError::PersistenceFailure("db offline".into()).into();
        let reply = err.to_reply("req-123");
        assert!(!reply.contains("db offline"));
        assert!(reply.contains("req-123"));
    }

    #[test]
    fn input_error_reply_is_user_facing() {
        let err: CoreError = InputError::NoMatch.into();
        assert_eq!(err.to_reply("req-1"), "You don't see that here.");
    }
}
