//! Connection attempt rate limiting.
//!
//! Grounded in the teacher's `RateLimitManager` shape: a `DashMap` of
//! per-key `governor` limiters, created lazily and pruned periodically.
//! Here the key is a player id rather than an IP/UID pair, and the only
//! limiter tracked is the connection-attempt one C3 needs.

use std::num::NonZeroU32;
use std::sync::Arc;

use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use tracing::debug;

type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Per-player connection attempt limiter: `attempts` allowed within
/// `window_seconds`, refilling gradually across the window rather than in
/// one lump at its end.
pub struct ConnectionRateLimiter {
    limiters: DashMap<String, Arc<DirectRateLimiter>>,
    attempts: u32,
    window_seconds: u64,
}

impl ConnectionRateLimiter {
    pub fn new(config: &crate::config::ConnectionConfig) -> Self {
        Self::from_parts(config.rate_limit_attempts, config.rate_limit_window_seconds)
    }

    /// Build a limiter from raw attempts/window, for callers keying on
    /// something other than a player id (e.g. the auth gate's per-source
    /// attempt limiting).
    pub fn from_parts(attempts: u32, window_seconds: u64) -> Self {
        Self {
            limiters: DashMap::new(),
            attempts,
            window_seconds,
        }
    }

    fn quota(&self) -> Quota {
        let attempts = NonZeroU32::new(self.attempts).unwrap_or(NonZeroU32::new(1).unwrap());
        let period = std::time::Duration::from_secs(self.window_seconds.max(1)) / attempts.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(attempts))
            .allow_burst(attempts)
    }

    /// True if `player_id` may attempt another connection right now.
    pub fn check(&self, player_id: &str) -> bool {
        let limiter = self
            .limiters
            .entry(player_id.to_string())
            .or_insert_with(|| Arc::new(GovRateLimiter::direct(self.quota())))
            .clone();

        let allowed = limiter.check().is_ok();
        if !allowed {
            debug!(player_id = %player_id, "connection rate limit exceeded");
        }
        allowed
    }

    pub fn remove(&self, player_id: &str) {
        self.limiters.remove(player_id);
    }

    /// Periodic pruning to bound memory; called from the maintenance loop.
    pub fn prune(&self, max_entries: usize) {
        if self.limiters.len() > max_entries {
            self.limiters.clear();
            debug!(max_entries, "cleared connection rate limiters");
        }
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> crate::config::ConnectionConfig {
        crate::config::ConnectionConfig {
            rate_limit_attempts: 2,
            rate_limit_window_seconds: 60,
        }
    }

    #[test]
    fn allows_up_to_configured_attempts_then_blocks() {
        let limiter = ConnectionRateLimiter::new(&config());
        assert!(limiter.check("alice"));
        assert!(limiter.check("alice"));
        assert!(!limiter.check("alice"));
    }

    #[test]
    fn players_are_independent() {
        let limiter = ConnectionRateLimiter::new(&config());
        limiter.check("alice");
        limiter.check("alice");
        assert!(!limiter.check("alice"));
        assert!(limiter.check("bob"));
    }

    #[test]
    fn remove_resets_the_limiter() {
        let limiter = ConnectionRateLimiter::new(&config());
        limiter.check("alice");
        limiter.check("alice");
        assert!(!limiter.check("alice"));
        limiter.remove("alice");
        assert!(limiter.check("alice"));
    }
}
