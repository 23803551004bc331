//! YAML schema for training runs

use crate::explain::ExplainConfig;
use crate::train::TrainConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete hyperparameter file
///
/// Every section is optional; omitted fields keep their defaults.
///
/// ```yaml
/// optimizer:
///   name: sgd
///   params: {momentum: 0.9}
/// training:
///   lr: 0.01
///   max_epochs: 80
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainSpec {
    pub optimizer: OptimSpec,
    pub training: TrainConfig,
    /// Settings for explanations against the artifacts this run produces
    pub explain: ExplainConfig,
}

/// Optimizer choice; the learning rate lives in [`TrainConfig::lr`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimSpec {
    /// `adam` or `sgd`
    pub name: String,
    /// Optimizer-specific parameters (`beta1`, `beta2`, `eps`, `momentum`)
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, serde_json::Value>,
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self { name: "adam".to_string(), params: HashMap::new() }
    }
}
