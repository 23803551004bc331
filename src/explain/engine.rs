//! Primary/fallback explanation selection

use super::background::load_background;
use super::config::ExplainConfig;
use super::fallback::fallback_explanation;
use super::request::ExplainRequest;
use super::result::{Explanation, ExplanationResult};
use super::shapley::SamplingShapley;
use crate::determinism::{DeterministicContext, Stream};
use crate::io::{metadata_path, ModelMetadata};
use crate::runtime::open_scorer;
use crate::{Error, Result};
use ndarray::{Array2, Axis};
use tracing::{debug, warn};

/// Explains single records against an exported artifact
///
/// [`explain`](Self::explain) never fails: any error on the model-based
/// path is logged and replaced by the arithmetic fallback.
#[derive(Debug, Clone, Default)]
pub struct ExplanationEngine {
    config: ExplainConfig,
}

impl ExplanationEngine {
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub fn explain(&self, request: &ExplainRequest) -> Explanation {
        match self.explain_with_model(request) {
            Ok(result) => Explanation::Explained(result),
            Err(err) => {
                match &err {
                    Error::CapabilityUnavailable(_) => warn!(error = %err, "model-based attribution unavailable, using fallback"),
                    _ => warn!(error = %err, "model-based attribution failed, using fallback"),
                }
                Explanation::Fallback(fallback_explanation(&self.config.fallback, request))
            }
        }
    }

    /// Sampling Shapley attribution through the compiled artifact
    pub fn explain_with_model(&self, request: &ExplainRequest) -> Result<ExplanationResult> {
        let side_car = metadata_path(&request.model_path);
        if !request.model_path.exists() || !side_car.exists() {
            return Err(Error::CapabilityUnavailable(format!(
                "artifact {} or its side-car is missing",
                request.model_path.display()
            )));
        }
        let meta = ModelMetadata::load(&side_car)?;
        let width = request.features.len();
        if meta.input_size != width {
            return Err(Error::Attribution(format!(
                "model takes {} features, request has {width}",
                meta.input_size
            )));
        }

        let names = request.feature_names();
        let values = request.values();
        let raw = Array2::from_shape_vec((1, width), values.clone())
            .map_err(|e| Error::Attribution(format!("input shape: {e}")))?;
        let x = meta.norm_params.apply(&raw)?;
        let background = self.background(request, &names, &meta)?;

        let mut scorer = open_scorer(&request.model_path, meta.input_size)?;
        let mut rng = DeterministicContext::new(self.config.seed).rng(Stream::Sampling);
        let attribution = SamplingShapley::new(self.config.samples, self.config.output_index).explain(
            scorer.as_mut(),
            x.index_axis(Axis(0), 0),
            background.view(),
            &mut rng,
        )?;
        debug!(samples = self.config.samples, rows = background.nrows(), "attribution complete");

        Ok(ExplanationResult::build(
            names,
            &values,
            attribution.values,
            attribution.expected_value,
            attribution.prediction,
            false,
        ))
    }

    /// Supplied background normalized with the side-car, or zeros in
    /// normalized space
    fn background(&self, request: &ExplainRequest, names: &[String], meta: &ModelMetadata) -> Result<Array2<f32>> {
        if let Some(path) = &request.background_path {
            match load_background(path, names) {
                Ok(table) => return meta.norm_params.apply(&table),
                Err(err) => warn!(path = %path.display(), error = %err, "background unreadable, using zero background"),
            }
        }
        Ok(Array2::zeros((self.config.background_rows.max(1), names.len())))
    }
}
