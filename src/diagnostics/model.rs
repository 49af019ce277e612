//! Read-only numeric snapshot of a fitted model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named metrics such as `edge_count` or `sigma_min`.
///
/// Produced for observability only; nothing in the driver branches on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    metrics: BTreeMap<String, f64>,
}

impl ModelDiagnostics {
    /// No metrics, as reported by an unfitted model
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Metrics in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
