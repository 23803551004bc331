//! Declarative configuration and command-line surface
//!
//! ```bash
//! kerf train --model-type waste_predictor --data jobs.json --output-dir models
//! kerf train --model-type time_estimator --data jobs.json --output-dir models --config spec.yaml --epochs 50
//! kerf explain --model-type waste_predictor --model-path models/waste_predictor.kerf --input-data '{"kerf": 3}'
//! kerf info --model-path models/waste_predictor.kerf
//! ```

mod builder;
mod cli;
mod schema;

pub use builder::{build_optimizer, load_config};
pub use cli::{apply_overrides, parse_args, Cli, Command, ExplainArgs, InfoArgs, TrainArgs};
pub use schema::{OptimSpec, TrainSpec};
