//! Subject registry configuration.

use serde::Deserialize;

use super::defaults::{default_subject_max_length, default_true};

/// Configuration for the subject registry (C1).
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectConfig {
    /// Maximum length of a concrete subject string.
    #[serde(default = "default_subject_max_length")]
    pub max_length: usize,
    /// Whether substituted placeholder values must match the strict
    /// alphabet (`[A-Za-z0-9-]+`) instead of the lenient one
    /// (`[A-Za-z0-9_-]+`).
    #[serde(default)]
    pub strict_alphabet: bool,
    /// Whether `validate` results are cached by subject string.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    /// Whether build/validate counters and timing are collected.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            max_length: default_subject_max_length(),
            strict_alphabet: false,
            cache_enabled: true,
            metrics_enabled: true,
        }
    }
}
