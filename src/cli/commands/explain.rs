//! Explain command implementation
//!
//! Stdout carries exactly one JSON object: the explanation report, or
//! `{"error": ...}` when the command fails.

use crate::config::{load_config, ExplainArgs};
use crate::explain::{ExplainConfig, ExplainRequest, ExplanationEngine, ExplanationReport};
use serde_json::{json, Value};

pub fn run_explain(args: ExplainArgs) -> Result<(), String> {
    match explain_json(&args) {
        Ok(report) => {
            println!("{report}");
            Ok(())
        }
        Err(message) => {
            println!("{}", json!({ "error": message }));
            Err(message)
        }
    }
}

fn explain_json(args: &ExplainArgs) -> Result<String, String> {
    let input: Value = serde_json::from_str(&args.input_data).map_err(|e| format!("Invalid JSON input: {e}"))?;
    let failed = |e: crate::Error| format!("Explanation failed: {e}");

    let request = ExplainRequest::new(&args.model_type, &args.model_path, &input, args.background_data.clone())
        .map_err(failed)?;

    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(failed)?.explain,
        None => ExplainConfig::default(),
    };
    if let Some(samples) = args.samples {
        config = config.with_samples(samples);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let explanation = ExplanationEngine::new(config).explain(&request);
    tracing::debug!(fallback = explanation.is_fallback(), "explanation complete");

    let report = ExplanationReport {
        result: explanation.into_result(),
        model_type: args.model_type.clone(),
        model_path: args.model_path.display().to_string(),
    };
    serde_json::to_string(&report).map_err(|e| failed(e.into()))
}
