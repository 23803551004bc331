//! Per-record prediction explanations
//!
//! [`ExplanationEngine::explain`] first tries sampling Shapley attribution
//! through the exported artifact. When the artifact, its side-car or the
//! scoring runtime is unavailable, or attribution fails, it falls back to a
//! per-model-type linear heuristic. Both paths produce the same
//! [`ExplanationResult`]; only `is_fallback` tells them apart.

mod background;
mod config;
mod engine;
mod fallback;
mod request;
mod result;
mod shapley;

pub use background::load_background;
pub use config::{ExplainConfig, FallbackRule, FallbackTable};
pub use engine::ExplanationEngine;
pub use fallback::fallback_explanation;
pub use request::{canonical_order, ExplainRequest};
pub use result::{
    Contribution, Explanation, ExplanationReport, ExplanationResult, FeatureImportance, TopContributors,
    TOP_CONTRIBUTORS,
};
pub use shapley::{Attribution, SamplingShapley, MAX_SAMPLES};
