//! Explanation engine settings and the fallback coefficient table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear heuristic for one model type: `contribution = value * coefficient`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackRule {
    pub baseline: f32,
    pub coefficient: f32,
    /// Non-positive values contribute nothing
    #[serde(default)]
    pub positive_only: bool,
}

impl FallbackRule {
    pub fn contribution(&self, value: f32) -> f32 {
        if self.positive_only && value <= 0.0 {
            0.0
        } else {
            value * self.coefficient
        }
    }
}

/// Per-model-type fallback rules
///
/// The constants are empirical approximations carried over from the
/// production service, not derived values. Override them from config
/// rather than editing them here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackTable {
    pub rules: BTreeMap<String, FallbackRule>,
    /// Applied to model types without a rule
    pub default: FallbackRule,
}

impl FallbackTable {
    pub fn rule(&self, model_type: &str) -> FallbackRule {
        self.rules.get(model_type).copied().unwrap_or(self.default)
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        let rules = BTreeMap::from([
            (
                "waste_predictor".to_string(),
                FallbackRule { baseline: 15.0, coefficient: 0.01, positive_only: true },
            ),
            (
                "time_estimator".to_string(),
                FallbackRule { baseline: 30.0, coefficient: 0.05, positive_only: false },
            ),
        ]);
        Self { rules, default: FallbackRule { baseline: 0.5, coefficient: 0.02, positive_only: false } }
    }
}

/// Explanation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Permutation samples drawn by the attribution estimator
    pub samples: usize,
    /// Rows of the all-zero background used when none is supplied
    pub background_rows: usize,
    /// Model output being explained
    pub output_index: usize,
    pub seed: u64,
    pub fallback: FallbackTable,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self { samples: 100, background_rows: 10, output_index: 0, seed: 42, fallback: FallbackTable::default() }
    }
}

impl ExplainConfig {
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
