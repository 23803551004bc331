//! Per-epoch training record

use serde::{Deserialize, Serialize};

/// One epoch of the history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochRecord {
    pub train_loss: f32,
    pub val_loss: f32,
    /// Learning rate the epoch ran with
    pub learning_rate: f32,
}

/// Append-only sequence of epoch records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochRecord>,
}

/// History digest written to the metadata side-car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSummary {
    pub final_train_loss: Option<f32>,
    pub final_val_loss: Option<f32>,
    pub epochs: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, train_loss: f32, val_loss: f32, learning_rate: f32) {
        self.epochs.push(EpochRecord { train_loss, val_loss, learning_rate });
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpochRecord> {
        self.epochs.iter()
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.epochs.last()
    }

    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            final_train_loss: self.last().map(|e| e.train_loss),
            final_val_loss: self.last().map(|e| e.val_loss),
            epochs: self.len(),
        }
    }
}
