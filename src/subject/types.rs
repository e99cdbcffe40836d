//! Core subject registry types.

use std::collections::HashMap;

use serde::Serialize;

/// A registered subject template: `{ name, template, required_params, description }`.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectPattern {
    pub name: String,
    pub template: String,
    pub required_params: Vec<String>,
    pub description: String,
}

impl SubjectPattern {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        required_params: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            required_params,
            description: description.into(),
        }
    }

    /// Tokens of the template, split on `.`.
    pub fn tokens(&self) -> Vec<&str> {
        self.template.split('.').collect()
    }
}

/// Parameters supplied to [`build`](super::registry::SubjectRegistry::build).
pub type Params = HashMap<String, String>;

/// A snapshot of registry metrics at a point in time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub build_count: u64,
    pub validation_count: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub errors_by_category: HashMap<&'static str, u64>,
    pub avg_duration_ms: f64,
    pub p95_duration_ms: f64,
}
