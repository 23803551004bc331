//! Explanation result shape shared by both paths

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Longest positive or negative contributor list
pub const TOP_CONTRIBUTORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Absolute contribution
    pub importance: f32,
    /// Raw input value
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub contribution: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopContributors {
    pub positive: Vec<Contribution>,
    pub negative: Vec<Contribution>,
}

/// Per-feature attribution of one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResult {
    pub feature_names: Vec<String>,
    pub shap_values: Vec<f32>,
    pub expected_value: f32,
    pub prediction: f32,
    pub feature_importance: Vec<FeatureImportance>,
    pub top_contributors: TopContributors,
    pub is_fallback: bool,
}

impl ExplanationResult {
    /// Assemble a result, deriving the importance ranking and top lists
    pub fn build(
        feature_names: Vec<String>,
        values: &[f32],
        shap_values: Vec<f32>,
        expected_value: f32,
        prediction: f32,
        is_fallback: bool,
    ) -> Self {
        // Stable sort: ties keep canonical order
        let mut ranked: Vec<usize> = (0..feature_names.len()).collect();
        ranked.sort_by(|&a, &b| {
            shap_values[b].abs().partial_cmp(&shap_values[a].abs()).unwrap_or(Ordering::Equal)
        });

        let feature_importance = ranked
            .iter()
            .map(|&i| FeatureImportance {
                feature: feature_names[i].clone(),
                importance: shap_values[i].abs(),
                value: values.get(i).copied().unwrap_or(0.0),
            })
            .collect();

        let pick = |keep: fn(f32) -> bool| -> Vec<Contribution> {
            ranked
                .iter()
                .filter(|&&i| keep(shap_values[i]))
                .take(TOP_CONTRIBUTORS)
                .map(|&i| Contribution { feature: feature_names[i].clone(), contribution: shap_values[i] })
                .collect()
        };
        let top_contributors = TopContributors { positive: pick(|c| c > 0.0), negative: pick(|c| c < 0.0) };

        Self {
            feature_names,
            shap_values,
            expected_value,
            prediction,
            feature_importance,
            top_contributors,
            is_fallback,
        }
    }
}

/// Outcome of [`super::ExplanationEngine::explain`]
#[derive(Debug, Clone, PartialEq)]
pub enum Explanation {
    Explained(ExplanationResult),
    Fallback(ExplanationResult),
}

impl Explanation {
    pub fn result(&self) -> &ExplanationResult {
        match self {
            Explanation::Explained(r) | Explanation::Fallback(r) => r,
        }
    }

    pub fn into_result(self) -> ExplanationResult {
        match self {
            Explanation::Explained(r) | Explanation::Fallback(r) => r,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Explanation::Fallback(_))
    }
}

/// Explanation entry point output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationReport {
    #[serde(flatten)]
    pub result: ExplanationResult,
    pub model_type: String,
    pub model_path: String,
}
