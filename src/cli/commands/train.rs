//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, build_optimizer, load_config, TrainArgs, TrainSpec};
use crate::data::{fit_transform, load_records, split, Dataset};
use crate::determinism::DeterministicContext;
use crate::io::{artifact_path, export_model, ExportedModel};
use crate::models::{ModelKind, TabularModel};
use crate::train::{TrainOutcome, Trainer};
use std::path::Path;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let kind: ModelKind = args.model_type.parse().map_err(|e| format!("{e}"))?;
    let mut spec = match &args.config {
        Some(path) => load_config(path).map_err(|e| format!("{e}"))?,
        None => TrainSpec::default(),
    };
    apply_overrides(&mut spec, &args);

    log(level, LogLevel::Normal, &format!("Kerf: training {kind} from {}", args.data.display()));
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Optimizer: {} (lr={}) | Epochs: {} | Batch size: {} | Seed: {}",
            spec.optimizer.name, spec.training.lr, spec.training.max_epochs, spec.training.batch_size, spec.training.seed
        ),
    );

    let (outcome, exported) =
        train_and_export(kind, &args.data, &args.output_dir, &spec).map_err(|e| format!("Training error: {e}"))?;

    let summary = outcome.history.summary();
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} epochs{}, best val loss {}",
            outcome.epochs_run,
            if outcome.stopped_early { " (early stop)" } else { "" },
            outcome.best_score.map_or_else(|| "n/a".to_string(), |s| format!("{s:.6}")),
        ),
    );
    log(level, LogLevel::Verbose, &format!("  Final train loss: {:?}", summary.final_train_loss));
    log(level, LogLevel::Normal, &format!("Saved model to {}", exported.artifact.display()));
    log(level, LogLevel::Normal, &format!("Saved metadata to {}", exported.metadata.display()));
    Ok(())
}

/// Load, normalize, split, train and export one model type
fn train_and_export(
    kind: ModelKind,
    data: &Path,
    output_dir: &Path,
    spec: &TrainSpec,
) -> crate::Result<(TrainOutcome, ExportedModel)> {
    let config = spec.training.clone();
    config.validate()?;
    let ctx = DeterministicContext::new(config.seed);

    let records = load_records(data)?;
    let (dataset, source) = kind.prepare_dataset(&records, &ctx);
    let (features, norm) = fit_transform(&dataset.features)?;
    let dataset = Dataset::new(features, dataset.labels)?;
    let (train_set, val_set) = split(&dataset, config.val_fraction, &ctx)?;
    tracing::info!(
        model = %kind,
        source = ?source,
        train = train_set.len(),
        val = val_set.len(),
        "dataset ready"
    );

    let mut model = kind.build(&ctx)?;
    tracing::debug!(parameters = model.parameter_count(), "model built");
    let optimizer = build_optimizer(&spec.optimizer, config.lr)?;
    let mut trainer = Trainer::new(kind.objective(), optimizer, config);
    let outcome = trainer.train(&mut model, &train_set, &val_set)?;

    let path = artifact_path(output_dir, kind.name());
    let exported = export_model(&mut model, &path, &norm, kind.name(), outcome.history.summary())?;
    Ok((outcome, exported))
}
