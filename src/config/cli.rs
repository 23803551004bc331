//! Command-line arguments

use super::schema::TrainSpec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kerf: train and explain cutting-optimization models
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "kerf")]
#[command(version)]
#[command(about = "Train tabular cutting-optimization models and explain their predictions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train one model type and export its artifact and side-car
    Train(TrainArgs),

    /// Explain one prediction as a JSON object on stdout
    Explain(ExplainArgs),

    /// Show the metadata side-car of an exported artifact
    Info(InfoArgs),
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// waste_predictor, time_estimator, algorithm_selector or anomaly_predictor
    #[arg(long)]
    pub model_type: String,

    /// JSON array of training records
    #[arg(long)]
    pub data: PathBuf,

    #[arg(long)]
    pub output_dir: PathBuf,

    /// YAML hyperparameter file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ExplainArgs {
    #[arg(long)]
    pub model_type: String,

    /// Exported artifact; its side-car must sit next to it
    #[arg(long)]
    pub model_path: PathBuf,

    /// JSON object of named numeric features
    #[arg(long)]
    pub input_data: String,

    /// CSV of background records with a header row
    #[arg(long)]
    pub background_data: Option<PathBuf>,

    /// YAML file whose `explain` section configures the engine
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Attribution permutation samples
    #[arg(long)]
    pub samples: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    #[arg(long)]
    pub model_path: PathBuf,

    /// Print the raw side-car JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a TrainSpec
pub fn apply_overrides(spec: &mut TrainSpec, args: &TrainArgs) {
    if let Some(epochs) = args.epochs {
        spec.training.max_epochs = epochs;
    }
    if let Some(lr) = args.lr {
        spec.training.lr = lr;
    }
    if let Some(batch_size) = args.batch_size {
        spec.training.batch_size = batch_size;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = seed;
    }
}
