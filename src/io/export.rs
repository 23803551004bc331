//! Model export: inference graph plus metadata side-car

use super::{metadata_path, ModelMetadata};
use crate::data::NormalizationParams;
use crate::models::TabularModel;
use crate::train::TrainingSummary;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of exported graphs
pub const ARTIFACT_EXTENSION: &str = "kerf";

/// Paths written by [`export_model`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedModel {
    pub artifact: PathBuf,
    pub metadata: PathBuf,
}

/// `<dir>/<model_type>.kerf`
pub fn artifact_path(dir: &Path, model_type: &str) -> PathBuf {
    dir.join(format!("{model_type}.{ARTIFACT_EXTENSION}"))
}

/// Switch `model` to inference mode and write its graph to `path` and the
/// side-car next to it
///
/// # Example
///
/// ```no_run
/// use kerf::data::NormalizationParams;
/// use kerf::determinism::DeterministicContext;
/// use kerf::io::{artifact_path, export_model};
/// use kerf::models::ModelKind;
/// use kerf::train::TrainingHistory;
/// # fn run(norm: NormalizationParams) -> kerf::Result<()> {
/// let kind = ModelKind::TimeEstimator;
/// let mut model = kind.build(&DeterministicContext::default())?;
/// let path = artifact_path("models".as_ref(), kind.name());
/// let written = export_model(&mut model, &path, &norm, kind.name(), TrainingHistory::new().summary())?;
/// println!("{}", written.metadata.display());
/// # Ok(())
/// # }
/// ```
pub fn export_model(
    model: &mut dyn TabularModel,
    path: &Path,
    norm_params: &NormalizationParams,
    model_type: &str,
    summary: TrainingSummary,
) -> Result<ExportedModel> {
    if norm_params.n_features() != model.input_arity() {
        return Err(Error::Artifact(format!(
            "normalization covers {} features but the model takes {}",
            norm_params.n_features(),
            model.input_arity()
        )));
    }

    model.set_training(false);
    let graph = model.to_graph();
    graph.validate()?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    graph.save(path)?;

    let metadata = metadata_path(path);
    ModelMetadata::new(model_type, norm_params.clone(), model.input_arity(), summary).save(&metadata)?;

    tracing::info!(artifact = %path.display(), metadata = %metadata.display(), "model exported");
    Ok(ExportedModel { artifact: path.to_path_buf(), metadata })
}
