//! Progress callback for logging training progress

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Logs a progress line every `log_interval` epochs
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    log_interval: usize,
    logged: usize,
}

impl ProgressCallback {
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval: log_interval.max(1), logged: 0 }
    }

    /// Lines emitted so far
    pub fn logged(&self) -> usize {
        self.logged
    }

    fn due(&self, epoch: usize) -> bool {
        (epoch + 1) % self.log_interval == 0
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self::new(10)
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if self.due(ctx.epoch) {
            self.logged += 1;
            tracing::info!(
                "Epoch {:3}/{} | Train: {:.6} | Val: {:.6} | LR: {:.2e}",
                ctx.epoch + 1,
                ctx.max_epochs,
                ctx.train_loss,
                ctx.val_loss,
                ctx.lr
            );
        }
        CallbackAction::Continue
    }

    fn on_train_end(&mut self, ctx: &CallbackContext) {
        if let Some(best) = ctx.best_score {
            tracing::info!(epochs = ctx.epoch + 1, best_val_loss = best, "training finished");
        }
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}
