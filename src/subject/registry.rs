//! Subject registry (C1): the single source of truth for message addressing.
//!
//! Grounded in `examples/original_source/server/services/nats_subject_manager/
//! manager.py`: validate-cache-first, register-with-structural-checks,
//! rolling-window metrics. Concurrency shape (a `DashMap` of read-mostly
//! state with a single administrative writer) follows the teacher's
//! `state/managers/client.rs`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::SubjectError;

use super::alphabet::is_legal_token;
use super::matching::{is_placeholder, matches_pattern, placeholder_name};
use super::patterns::builtin_patterns;
use super::types::{MetricsSnapshot, Params, SubjectPattern};

const DURATION_WINDOW: usize = 1000;

struct Metrics {
    build_count: AtomicU64,
    validation_count: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    errors_by_category: DashMap<&'static str, AtomicU64>,
    durations_ms: Mutex<VecDeque<f64>>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            build_count: AtomicU64::new(0),
            validation_count: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            errors_by_category: DashMap::new(),
            durations_ms: Mutex::new(VecDeque::with_capacity(DURATION_WINDOW)),
        }
    }
}

impl Metrics {
    fn record_duration(&self, ms: f64) {
        let mut durations = self.durations_ms.lock();
        if durations.len() == DURATION_WINDOW {
            durations.pop_front();
        }
        durations.push_back(ms);
    }

    fn record_error(&self, category: &'static str) {
        self.errors_by_category
            .entry(category)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
        crate::metrics::record_subject_error(category);
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let durations = self.durations_ms.lock();
        let (avg, p95) = if durations.is_empty() {
            (0.0, 0.0)
        } else {
            let sum: f64 = durations.iter().sum();
            let avg = sum / durations.len() as f64;
            let mut sorted: Vec<f64> = durations.iter().copied().collect();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let idx = ((sorted.len() as f64) * 0.95).floor() as usize;
            let p95 = sorted[idx.min(sorted.len() - 1)];
            (avg, p95)
        };

        MetricsSnapshot {
            build_count: self.build_count.load(Ordering::Relaxed),
            validation_count: self.validation_count.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            errors_by_category: self
                .errors_by_category
                .iter()
                .map(|e| (*e.key(), e.value().load(Ordering::Relaxed)))
                .collect(),
            avg_duration_ms: avg,
            p95_duration_ms: p95,
        }
    }
}

/// Registers, validates, and expands hierarchical subject patterns.
pub struct SubjectRegistry {
    patterns: DashMap<String, SubjectPattern>,
    validation_cache: DashMap<String, bool>,
    strict_alphabet: bool,
    max_length: usize,
    cache_enabled: bool,
    metrics_enabled: bool,
    metrics: Metrics,
}

impl SubjectRegistry {
    /// Build a registry seeded with the built-in pattern table.
    pub fn new(config: &crate::config::SubjectConfig) -> Self {
        let registry = Self {
            patterns: DashMap::new(),
            validation_cache: DashMap::new(),
            strict_alphabet: config.strict_alphabet,
            max_length: config.max_length,
            cache_enabled: config.cache_enabled,
            metrics_enabled: config.metrics_enabled,
            metrics: Metrics::default(),
        };
        for pattern in builtin_patterns() {
            registry.patterns.insert(pattern.name.clone(), pattern);
        }
        registry
    }

    /// Substitute every placeholder in `pattern_name`'s template and
    /// validate the result.
    pub fn build(&self, pattern_name: &str, params: &Params) -> Result<String, SubjectError> {
        let start = Instant::now();
        let result = self.build_inner(pattern_name, params);
        if self.metrics_enabled {
            self.metrics.build_count.fetch_add(1, Ordering::Relaxed);
            crate::metrics::SUBJECT_BUILDS_TOTAL.inc();
            self.metrics
                .record_duration(start.elapsed().as_secs_f64() * 1000.0);
            if let Err(ref e) = result {
                self.metrics.record_error(e.error_code());
            }
        }
        result
    }

    fn build_inner(&self, pattern_name: &str, params: &Params) -> Result<String, SubjectError> {
        let pattern = self
            .patterns
            .get(pattern_name)
            .ok_or_else(|| SubjectError::PatternNotFound(pattern_name.to_string()))?;

        let missing: Vec<String> = pattern
            .required_params
            .iter()
            .filter(|name| !params.contains_key(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(SubjectError::MissingParameter {
                pattern: pattern_name.to_string(),
                missing,
            });
        }

        let mut tokens = Vec::with_capacity(pattern.tokens().len());
        for token in pattern.tokens() {
            if let Some(name) = placeholder_name(token) {
                let value = params
                    .get(name)
                    .ok_or_else(|| SubjectError::MissingParameter {
                        pattern: pattern_name.to_string(),
                        missing: vec![name.to_string()],
                    })?;
                if !is_legal_token(value, self.strict_alphabet) {
                    return Err(SubjectError::InvalidValue(name.to_string()));
                }
                tokens.push(value.clone());
            } else {
                tokens.push(token.to_string());
            }
        }

        let subject = tokens.join(".");
        if subject.len() > self.max_length {
            return Err(SubjectError::SubjectTooLong);
        }
        Ok(subject)
    }

    /// True iff `subject`, tokenised on `.`, matches at least one registered
    /// pattern structurally. Cached by subject string when enabled.
    pub fn validate(&self, subject: &str) -> bool {
        if self.metrics_enabled {
            self.metrics
                .validation_count
                .fetch_add(1, Ordering::Relaxed);
            crate::metrics::SUBJECT_VALIDATIONS_TOTAL.inc();
        }

        if self.cache_enabled {
            if let Some(cached) = self.validation_cache.get(subject) {
                if self.metrics_enabled {
                    self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                    crate::metrics::SUBJECT_CACHE_HITS_TOTAL.inc();
                }
                return *cached;
            }
            if self.metrics_enabled {
                self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
            }
        }

        let is_valid = self
            .patterns
            .iter()
            .any(|entry| matches_pattern(subject, entry.value(), self.strict_alphabet));

        if self.cache_enabled {
            self.validation_cache
                .insert(subject.to_string(), is_valid);
        }
        is_valid
    }

    /// Register a new pattern. Fails with `invalid_pattern` on structural
    /// defects; invalidates the validation cache on success.
    pub fn register(
        &self,
        name: &str,
        template: &str,
        required: Vec<String>,
        description: &str,
    ) -> Result<(), SubjectError> {
        if self.patterns.contains_key(name) {
            return Err(SubjectError::InvalidPattern(format!(
                "duplicate pattern name '{name}'"
            )));
        }

        let tokens: Vec<&str> = template.split('.').collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(SubjectError::InvalidPattern(
                "template contains an empty token".to_string(),
            ));
        }
        if template.starts_with('.') || template.ends_with('.') || template.contains("..") {
            return Err(SubjectError::InvalidPattern(
                "template has a leading, trailing, or doubled dot".to_string(),
            ));
        }

        let placeholder_names: Vec<&str> = tokens
            .iter()
            .filter_map(|t| placeholder_name(t))
            .collect();
        for required_param in &required {
            if !placeholder_names.contains(&required_param.as_str()) {
                return Err(SubjectError::InvalidPattern(format!(
                    "required parameter '{required_param}' has no placeholder in the template"
                )));
            }
        }

        let pattern = SubjectPattern::new(name, template, required, description);
        self.patterns.insert(name.to_string(), pattern);
        self.validation_cache.clear();
        Ok(())
    }

    /// Substitute every placeholder with `*`, rejecting overly-broad
    /// subscriptions.
    pub fn subscription_pattern(&self, name: &str) -> Result<String, SubjectError> {
        let pattern = self
            .patterns
            .get(name)
            .ok_or_else(|| SubjectError::PatternNotFound(name.to_string()))?;

        let tokens: Vec<String> = pattern
            .tokens()
            .into_iter()
            .map(|t| if is_placeholder(t) { "*".to_string() } else { t.to_string() })
            .collect();

        let candidate = tokens.join(".");
        if !is_reasonably_scoped(&tokens) {
            return Err(SubjectError::InvalidPattern(format!(
                "subscription pattern '{candidate}' would be overly broad"
            )));
        }
        Ok(candidate)
    }

    pub fn all_patterns(&self) -> Vec<SubjectPattern> {
        self.patterns.iter().map(|e| e.value().clone()).collect()
    }

    /// Resolve `subject` against the registered patterns and pull out its
    /// `room_id`/`player_id` placeholder values, if any, for envelope
    /// scoping. `target_id` counts as a player id (`chat.whisper.player`).
    pub fn scope_ids(&self, subject: &str) -> (Option<String>, Option<String>) {
        let subject_tokens: Vec<&str> = subject.split('.').collect();
        for entry in self.patterns.iter() {
            let pattern = entry.value();
            if !matches_pattern(subject, pattern, self.strict_alphabet) {
                continue;
            }
            let mut player_id = None;
            let mut room_id = None;
            for (token, subject_token) in pattern.tokens().iter().zip(subject_tokens.iter()) {
                match placeholder_name(token) {
                    Some("room_id") => room_id = Some((*subject_token).to_string()),
                    Some("player_id") | Some("target_id") => {
                        player_id = Some((*subject_token).to_string())
                    }
                    _ => {}
                }
            }
            return (player_id, room_id);
        }
        (None, None)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Rejects patterns with more than two wildcards, an all-wildcard pattern
/// of more than one token, a single-token wildcard, or a leading wildcard.
fn is_reasonably_scoped(tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let wildcard_count = tokens.iter().filter(|t| t.as_str() == "*" || t.as_str() == ">").count();

    if wildcard_count > 2 {
        return false;
    }
    if tokens.len() == 1 && wildcard_count == 1 {
        return false;
    }
    if wildcard_count == tokens.len() && tokens.len() > 1 {
        return false;
    }
    if tokens[0] == "*" || tokens[0] == ">" {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn registry() -> SubjectRegistry {
        SubjectRegistry::new(&crate::config::SubjectConfig::default())
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn build_then_validate_round_trips() {
        let registry = registry();
        let subject = registry
            .build("chat_say_room", &params(&[("room_id", "arkham_1")]))
            .unwrap();
        assert_eq!(subject, "chat.say.room.arkham_1");
        assert!(registry.validate(&subject));
    }

    #[test]
    fn build_fails_on_missing_parameter() {
        let registry = registry();
        let err = registry.build("chat_say_room", &params(&[])).unwrap_err();
        assert_eq!(err.error_code(), "missing_parameter");
    }

    #[test]
    fn build_fails_on_illegal_value() {
        let registry = registry();
        let err = registry
            .build("chat_say_room", &params(&[("room_id", "arkham room!")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_value");
    }

    #[test]
    fn build_fails_on_unknown_pattern() {
        let registry = registry();
        let err = registry.build("no_such_pattern", &params(&[])).unwrap_err();
        assert_eq!(err.error_code(), "pattern_not_found");
    }

    #[test]
    fn subscription_pattern_has_one_star_per_placeholder() {
        let registry = registry();
        let pattern = registry.subscription_pattern("chat_say_room").unwrap();
        assert_eq!(pattern, "chat.say.room.*");
    }

    #[test]
    fn subscription_pattern_rejects_all_wildcard() {
        let registry = registry();
        registry
            .register("too_broad", "{a}.{b}", vec!["a".into(), "b".into()], "")
            .unwrap();
        let err = registry.subscription_pattern("too_broad").unwrap_err();
        assert_eq!(err.error_code(), "invalid_pattern");
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let registry = registry();
        let err = registry
            .register("chat_say_room", "chat.say.room.{room_id}", vec!["room_id".into()], "")
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_pattern");
    }

    #[test]
    fn register_rejects_missing_placeholder_for_required_param() {
        let registry = registry();
        let err = registry
            .register("broken", "chat.say.room", vec!["room_id".into()], "")
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_pattern");
    }

    #[test]
    fn register_invalidates_validation_cache() {
        let registry = registry();
        assert!(!registry.validate("widget.foo.bar"));
        registry
            .register("widget_event", "widget.{name}.bar", vec!["name".into()], "")
            .unwrap();
        assert!(registry.validate("widget.foo.bar"));
    }

    #[test]
    fn global_declares_no_required_params() {
        let registry = registry();
        let subject = registry.build("chat_global", &params(&[])).unwrap();
        assert_eq!(subject, "chat.global");
    }
}
