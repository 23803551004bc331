//! Training orchestration
//!
//! - Loss functions for continuous and class targets, dispatched by [`Objective`]
//! - Mini-batching with per-epoch seeded shuffles
//! - Early stopping with best-checkpoint retention
//! - The [`Trainer`] epoch loop with plateau scheduling and gradient clipping
//! - Epoch history and callbacks

mod batch;
pub mod callback;
mod config;
mod early_stopping;
mod history;
mod loss;
mod objective;
mod trainer;

pub use batch::{Batch, BatchLoader};
pub use callback::{CallbackAction, CallbackContext, CallbackManager, ProgressCallback, TrainerCallback};
pub use config::TrainConfig;
pub use early_stopping::EarlyStopping;
pub use history::{EpochRecord, TrainingHistory, TrainingSummary};
pub use loss::{ClassificationLossFn, CrossEntropyLoss, LossFn, MSELoss};
pub use objective::Objective;
pub use trainer::{TrainOutcome, Trainer};
