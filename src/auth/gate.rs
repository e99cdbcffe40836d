//! The authentication gate composes token issue/validation with per-source
//! rate limiting, the way C3's connection manager composes grace tracking
//! with its own rate limiter. A single `AuthGate` is shared across all
//! connections.
//!
//! Admin status is not carried in the token itself; it is read from the
//! player record's `is_admin` flag at validation time, matching the
//! original's `current_user.is_admin` check on its user model rather than a
//! claim baked into the token.

use std::sync::Arc;

use tracing::warn;

use crate::config::AuthConfig;
use crate::error::PolicyError;
use crate::persistence::Persistence;
use crate::security::rate_limit::ConnectionRateLimiter;

use super::token::{self, SessionClaims, TokenError};

/// A validated session, handed back to callers that need to know who is
/// asking and whether they may act as an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub is_admin: bool,
}

pub struct AuthGate {
    secret: String,
    token_lifetime_seconds: u64,
    validation_limiter: ConnectionRateLimiter,
    persistence: Arc<dyn Persistence>,
}

impl AuthGate {
    pub fn new(config: &AuthConfig, persistence: Arc<dyn Persistence>) -> Self {
        let secret = config.token_secret.clone().unwrap_or_else(|| {
            warn!("auth.token_secret is unset; generating an ephemeral secret for this run");
            generate_ephemeral_secret()
        });

        Self {
            secret,
            token_lifetime_seconds: config.token_lifetime_seconds,
            validation_limiter: ConnectionRateLimiter::from_parts(
                config.rate_limit_attempts,
                config.rate_limit_window_seconds,
            ),
            persistence,
        }
    }

    /// Issue a fresh session token for `user_id`.
    pub fn issue_session_token(&self, user_id: &str) -> String {
        token::issue(user_id, &self.secret, self.token_lifetime_seconds)
    }

    /// Validate `token` on behalf of `source` (an IP or connection id used
    /// only for rate limiting, never persisted). Rejects missing, malformed,
    /// tampered, or expired tokens, and throttles repeated bad attempts from
    /// the same source. A token naming a player that no longer exists is
    /// treated as unauthenticated rather than surfacing a storage error.
    pub async fn validate_session_token(
        &self,
        source: &str,
        token: &str,
    ) -> Result<AuthenticatedUser, PolicyError> {
        if !self.validation_limiter.check(source) {
            return Err(PolicyError::RateLimited);
        }

        let SessionClaims { user_id, .. } = token::validate(token, &self.secret).map_err(|err| {
            match err {
                TokenError::Expired | TokenError::Malformed | TokenError::BadSignature => {
                    PolicyError::Unauthenticated
                }
            }
        })?;

        let is_admin = self
            .persistence
            .get_player_by_id(&user_id)
            .await
            .map_err(|_| PolicyError::Unauthenticated)?
            .ok_or(PolicyError::Unauthenticated)?
            .is_admin;

        Ok(AuthenticatedUser { user_id, is_admin })
    }

    /// Require that `user` is an administrator, for admin-only surfaces
    /// (the subject-registry HTTP endpoints).
    pub fn require_admin(&self, user: &AuthenticatedUser) -> Result<(), PolicyError> {
        if user.is_admin {
            Ok(())
        } else {
            Err(PolicyError::Forbidden)
        }
    }
}

fn generate_ephemeral_secret() -> String {
    use base64::Engine as _;
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
