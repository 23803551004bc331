//! Core traits and types for the callback system

/// Training state passed to callbacks at the end of each epoch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned
    pub max_epochs: usize,
    /// Mean training batch loss of the epoch
    pub train_loss: f32,
    /// Mean validation batch loss of the epoch
    pub val_loss: f32,
    /// Learning rate used during the epoch
    pub lr: f32,
    /// Best validation loss seen so far
    pub best_score: Option<f32>,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

/// Action to take after a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop after this epoch
    Stop,
}

/// Hook into training events
///
/// All methods have default no-op implementations.
pub trait TrainerCallback {
    /// Called before the first epoch
    fn on_train_begin(&mut self, _ctx: &CallbackContext) {}

    /// Called after each epoch, once history and early stopping are updated
    fn on_epoch_end(&mut self, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after the best checkpoint has been restored
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
