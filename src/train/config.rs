//! Training hyperparameters

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hyperparameters of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Initial learning rate
    pub lr: f32,
    pub batch_size: usize,
    pub max_epochs: usize,
    /// Epochs without validation improvement before stopping
    pub patience: usize,
    /// Minimum validation loss decrease that counts as improvement
    pub min_delta: f32,
    pub seed: u64,
    /// Share of rows held out for validation, in `(0, 1)`
    pub val_fraction: f32,
    /// Global gradient L2 norm cap
    pub max_grad_norm: Option<f32>,
    /// Plateau scheduler multiplicative factor
    pub lr_factor: f32,
    /// Plateau scheduler patience in epochs
    pub lr_patience: usize,
    /// Plateau scheduler floor
    pub min_lr: f32,
    /// Plateau scheduler relative improvement threshold
    pub lr_threshold: f32,
    /// Emit a progress line every this many epochs
    pub log_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lr: 0.001,
            batch_size: 32,
            max_epochs: 150,
            patience: 20,
            min_delta: 1e-4,
            seed: 42,
            val_fraction: 0.2,
            max_grad_norm: Some(1.0),
            lr_factor: 0.5,
            lr_patience: 5,
            min_lr: 1e-6,
            lr_threshold: 1e-4,
            log_interval: 10,
        }
    }
}

impl TrainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn with_early_stopping(mut self, patience: usize, min_delta: f32) -> Self {
        self.patience = patience;
        self.min_delta = min_delta;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_val_fraction(mut self, fraction: f32) -> Self {
        self.val_fraction = fraction;
        self
    }

    /// Set gradient clipping; `None` disables it
    pub fn with_grad_clip(mut self, max_norm: Option<f32>) -> Self {
        self.max_grad_norm = max_norm;
        self
    }

    pub fn with_plateau(mut self, factor: f32, patience: usize, min_lr: f32) -> Self {
        self.lr_factor = factor;
        self.lr_patience = patience;
        self.min_lr = min_lr;
        self
    }

    pub fn with_log_interval(mut self, epochs: usize) -> Self {
        self.log_interval = epochs;
        self
    }

    /// Reject values the training loop cannot run with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Config(msg));

        if !(self.lr.is_finite() && self.lr > 0.0) {
            return fail(format!("learning rate must be positive, got {}", self.lr));
        }
        if self.batch_size == 0 {
            return fail("batch size must be positive".into());
        }
        if self.max_epochs == 0 {
            return fail("max epochs must be positive".into());
        }
        if !(self.val_fraction > 0.0 && self.val_fraction < 1.0) {
            return fail(format!("validation fraction must be in (0, 1), got {}", self.val_fraction));
        }
        if self.min_delta < 0.0 {
            return fail(format!("min delta must be non-negative, got {}", self.min_delta));
        }
        if let Some(norm) = self.max_grad_norm {
            if !(norm.is_finite() && norm > 0.0) {
                return fail(format!("max gradient norm must be positive, got {norm}"));
            }
        }
        if !(self.lr_factor > 0.0 && self.lr_factor < 1.0) {
            return fail(format!("scheduler factor must be in (0, 1), got {}", self.lr_factor));
        }
        if self.min_lr < 0.0 || self.lr_threshold < 0.0 {
            return fail("scheduler floor and threshold must be non-negative".into());
        }
        Ok(())
    }
}
