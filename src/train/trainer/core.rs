//! Core Trainer struct and basic methods

use crate::determinism::DeterministicContext;
use crate::optim::{LRScheduler, Optimizer, ReduceLROnPlateau};
use crate::train::callback::{CallbackManager, ProgressCallback, TrainerCallback};
use crate::train::{Objective, TrainConfig};

/// Drives training of any [`TabularModel`](crate::models::TabularModel)
///
/// The trainer owns the loss, optimizer, scheduler and callbacks; the model
/// is borrowed for the duration of [`Trainer::train`].
pub struct Trainer {
    pub(crate) objective: Objective,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) scheduler: Box<dyn LRScheduler>,
    pub(crate) config: TrainConfig,
    pub(crate) ctx: DeterministicContext,
    pub(crate) callbacks: CallbackManager,
}

impl Trainer {
    /// Create a trainer with a plateau scheduler and progress logging built
    /// from `config`
    pub fn new(objective: Objective, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        let scheduler = ReduceLROnPlateau::new(
            optimizer.lr(),
            config.lr_factor,
            config.lr_patience,
            config.min_lr,
            config.lr_threshold,
        );
        let mut callbacks = CallbackManager::new();
        callbacks.add(ProgressCallback::new(config.log_interval));

        Self {
            objective,
            optimizer,
            scheduler: Box::new(scheduler),
            ctx: DeterministicContext::new(config.seed),
            config,
            callbacks,
        }
    }

    /// Replace the learning-rate scheduler
    pub fn with_scheduler(mut self, scheduler: Box<dyn LRScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }
}
