//! Explanation requests and canonical feature order

use crate::models::ModelKind;
use crate::{Error, Result};
use serde_json::Value;
use std::path::PathBuf;

/// One record to explain against one artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainRequest {
    pub model_type: String,
    pub model_path: PathBuf,
    /// Named feature values in canonical order
    pub features: Vec<(String, f32)>,
    pub background_path: Option<PathBuf>,
}

impl ExplainRequest {
    /// Build a request from a JSON object of named numeric features
    ///
    /// Numbers, booleans and numeric strings are accepted as values.
    pub fn new(
        model_type: impl Into<String>,
        model_path: impl Into<PathBuf>,
        input: &Value,
        background_path: Option<PathBuf>,
    ) -> Result<Self> {
        let model_type = model_type.into();
        let object = input
            .as_object()
            .ok_or_else(|| Error::Input("input data must be a JSON object of named features".into()))?;

        let mut features = Vec::with_capacity(object.len());
        for (name, value) in object {
            features.push((name.clone(), numeric(name, value)?));
        }
        canonical_order(&model_type, &mut features);

        Ok(Self { model_type, model_path: model_path.into(), features, background_path })
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn values(&self) -> Vec<f32> {
        self.features.iter().map(|&(_, v)| v).collect()
    }
}

fn numeric(name: &str, value: &Value) -> Result<f32> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Input(format!("feature '{name}' is not numeric: {value}")))
}

/// Declared order of a registered model type when every name belongs to
/// it, lexicographic otherwise
pub fn canonical_order(model_type: &str, features: &mut [(String, f32)]) {
    let declared = model_type.parse::<ModelKind>().ok().map(|k| k.feature_names());
    let position = |name: &str| declared.and_then(|names| names.iter().position(|n| *n == name));

    if declared.is_some() && features.iter().all(|(name, _)| position(name).is_some()) {
        features.sort_by_key(|(name, _)| position(name));
    } else {
        features.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type_sorts_lexicographically() {
        let req = ExplainRequest::new("custom", "m.kerf", &json!({"b": 1, "a": 2.5, "c": true}), None).expect("valid");
        assert_eq!(req.feature_names(), vec!["a", "b", "c"]);
        assert_eq!(req.values(), vec![2.5, 1.0, 1.0]);
    }

    #[test]
    fn test_registered_type_uses_declared_order() {
        let input = json!({"kerf": 3, "totalPieceCount": 100, "uniquePieceCount": 7});
        let req = ExplainRequest::new("waste_predictor", "m.kerf", &input, None).expect("valid");
        assert_eq!(req.feature_names(), vec!["totalPieceCount", "uniquePieceCount", "kerf"]);
    }

    #[test]
    fn test_foreign_name_falls_back_to_lexicographic() {
        let input = json!({"totalPieceCount": 100, "a": 1});
        let req = ExplainRequest::new("waste_predictor", "m.kerf", &input, None).expect("valid");
        assert_eq!(req.feature_names(), vec!["a", "totalPieceCount"]);
    }

    #[test]
    fn test_non_numeric_value_is_input_error() {
        let err = ExplainRequest::new("x", "m", &json!({"a": "ten"}), None);
        assert!(matches!(err, Err(Error::Input(_))));
        let err = ExplainRequest::new("x", "m", &json!([1, 2]), None);
        assert!(matches!(err, Err(Error::Input(_))));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let req = ExplainRequest::new("x", "m", &json!({"a": " 4.5 "}), None).expect("valid");
        assert_eq!(req.values(), vec![4.5]);
    }
}
