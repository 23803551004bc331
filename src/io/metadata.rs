//! Metadata side-car written next to every artifact

use crate::data::NormalizationParams;
use crate::train::TrainingSummary;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Side-car schema version
pub const METADATA_VERSION: &str = "2.0.0";

/// Everything inference and explanation need besides the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub model_type: String,
    pub version: String,
    pub norm_params: NormalizationParams,
    pub input_size: usize,
    pub train_history: TrainingSummary,
    pub exported_at: DateTime<Utc>,
    pub device: String,
}

impl ModelMetadata {
    pub fn new(model_type: &str, norm_params: NormalizationParams, input_size: usize, train_history: TrainingSummary) -> Self {
        Self {
            model_type: model_type.to_string(),
            version: METADATA_VERSION.to_string(),
            norm_params,
            input_size,
            train_history,
            exported_at: Utc::now(),
            device: "cpu".to_string(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and check that the normalization parameters match `inputSize`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let meta: ModelMetadata = serde_json::from_str(&content)
            .map_err(|e| Error::Artifact(format!("{} is not a metadata side-car: {e}", path.display())))?;
        if meta.norm_params.n_features() != meta.input_size {
            return Err(Error::Artifact(format!(
                "side-car declares {} inputs but carries {} normalization columns",
                meta.input_size,
                meta.norm_params.n_features()
            )));
        }
        Ok(meta)
    }
}

/// `<dir>/<stem>_metadata.json` for an artifact at `<dir>/<stem>.<ext>`
pub fn metadata_path(artifact: &Path) -> PathBuf {
    let stem = artifact.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    artifact.with_file_name(format!("{stem}_metadata.json"))
}
