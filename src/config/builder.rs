//! Build training components from configuration

use super::schema::{OptimSpec, TrainSpec};
use crate::optim::{Adam, Optimizer, SGD};
use crate::{Error, Result};
use std::fs;
use std::path::Path;

const PARAM_MOMENTUM: &str = "momentum";
const PARAM_BETA1: &str = "beta1";
const PARAM_BETA2: &str = "beta2";
const PARAM_EPS: &str = "eps";

fn param(spec: &OptimSpec, key: &str, default: f32) -> f32 {
    spec.params.get(key).and_then(serde_json::Value::as_f64).map_or(default, |v| v as f32)
}

/// Build the optimizer named by `spec` at learning rate `lr`
pub fn build_optimizer(spec: &OptimSpec, lr: f32) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "sgd" => Ok(Box::new(SGD::new(lr, param(spec, PARAM_MOMENTUM, 0.0)))),
        "adam" => Ok(Box::new(Adam::new(
            lr,
            param(spec, PARAM_BETA1, 0.9),
            param(spec, PARAM_BETA2, 0.999),
            param(spec, PARAM_EPS, 1e-8),
        ))),
        name => Err(Error::Config(format!("Unknown optimizer: {name}. Supported: sgd, adam"))),
    }
}

/// Load and validate a hyperparameter file
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<TrainSpec> {
    let path = config_path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file {}: {e}", path.display())))?;
    let spec: TrainSpec =
        serde_yaml::from_str(&yaml).map_err(|e| Error::Config(format!("Failed to parse YAML config: {e}")))?;
    spec.training.validate()?;
    Ok(spec)
}
