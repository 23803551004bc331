//! Arithmetic explanation used when model-based attribution is unavailable

use super::config::FallbackTable;
use super::request::ExplainRequest;
use super::result::ExplanationResult;

/// Linear per-feature contributions around the model type's baseline
pub fn fallback_explanation(table: &FallbackTable, request: &ExplainRequest) -> ExplanationResult {
    let rule = table.rule(&request.model_type);
    let values = request.values();
    let contributions: Vec<f32> = values.iter().map(|&v| rule.contribution(v)).collect();
    let prediction = rule.baseline + contributions.iter().sum::<f32>();

    ExplanationResult::build(request.feature_names(), &values, contributions, rule.baseline, prediction, true)
}
