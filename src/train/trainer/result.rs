//! Training result types

use crate::train::TrainingHistory;

/// Result of a training run; the model itself is updated in place
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub history: TrainingHistory,
    /// Best validation loss, the one whose checkpoint was restored
    pub best_score: Option<f32>,
    /// Zero-based epoch of the best validation loss
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
    pub epochs_run: usize,
    pub elapsed_secs: f64,
}
