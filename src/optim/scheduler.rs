//! Learning rate schedulers
//!
//! - `ReduceLROnPlateau` - multiply the rate by a factor when a monitored
//!   metric stops improving

use super::Optimizer;

/// Learning rate scheduler driven by a monitored metric
pub trait LRScheduler {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler with the latest metric (called once per epoch)
    fn step(&mut self, metric: f32);

    /// Apply the current learning rate to an optimizer
    fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}

/// Reduce the learning rate when a metric (lower is better) plateaus
///
/// A metric counts as an improvement when `metric < best * (1 - threshold)`.
/// After more than `patience` consecutive non-improving steps the rate becomes
/// `max(lr * factor, min_lr)` and the counter resets. Reductions smaller than
/// `eps` are skipped.
#[derive(Debug, Clone)]
pub struct ReduceLROnPlateau {
    lr: f32,
    factor: f32,
    patience: usize,
    min_lr: f32,
    threshold: f32,
    eps: f32,
    best: f32,
    num_bad_epochs: usize,
}

impl ReduceLROnPlateau {
    /// Create a scheduler starting from `initial_lr`
    pub fn new(initial_lr: f32, factor: f32, patience: usize, min_lr: f32, threshold: f32) -> Self {
        Self {
            lr: initial_lr,
            factor,
            patience,
            min_lr,
            threshold,
            eps: 1e-8,
            best: f32::INFINITY,
            num_bad_epochs: 0,
        }
    }

    /// Best metric seen so far
    pub fn best(&self) -> f32 {
        self.best
    }

    /// Consecutive non-improving steps since the last improvement or reduction
    pub fn num_bad_epochs(&self) -> usize {
        self.num_bad_epochs
    }

    fn is_better(&self, metric: f32) -> bool {
        metric < self.best * (1.0 - self.threshold)
    }
}

impl LRScheduler for ReduceLROnPlateau {
    fn get_lr(&self) -> f32 {
        self.lr
    }

    fn step(&mut self, metric: f32) {
        if self.is_better(metric) {
            self.best = metric;
            self.num_bad_epochs = 0;
        } else {
            self.num_bad_epochs += 1;
        }

        if self.num_bad_epochs > self.patience {
            let new_lr = (self.lr * self.factor).max(self.min_lr);
            if self.lr - new_lr > self.eps {
                tracing::info!(old_lr = self.lr, new_lr, "reducing learning rate on plateau");
                self.lr = new_lr;
            }
            self.num_bad_epochs = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::SGD;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_plateau_reduces_after_patience_exceeded() {
        let mut sched = ReduceLROnPlateau::new(0.1, 0.5, 2, 1e-6, 1e-4);
        sched.step(1.0);
        // Three bad epochs: the third exceeds patience = 2
        sched.step(1.0);
        sched.step(1.0);
        assert_abs_diff_eq!(sched.get_lr(), 0.1);
        sched.step(1.0);
        assert_abs_diff_eq!(sched.get_lr(), 0.05);
        assert_eq!(sched.num_bad_epochs(), 0);
    }

    #[test]
    fn test_plateau_relative_threshold_ignores_tiny_gains() {
        let mut sched = ReduceLROnPlateau::new(0.1, 0.5, 0, 1e-6, 1e-2);
        sched.step(1.0);
        // 0.995 is within 1% of best, so it is not an improvement
        sched.step(0.995);
        assert_abs_diff_eq!(sched.get_lr(), 0.05);
        assert_abs_diff_eq!(sched.best(), 1.0);
    }

    #[test]
    fn test_plateau_respects_min_lr() {
        let mut sched = ReduceLROnPlateau::new(1e-6, 0.5, 0, 1e-6, 1e-4);
        sched.step(1.0);
        sched.step(1.0);
        assert_abs_diff_eq!(sched.get_lr(), 1e-6);
    }

    #[test]
    fn test_apply_sets_optimizer_lr() {
        let mut sched = ReduceLROnPlateau::new(0.2, 0.5, 0, 1e-6, 1e-4);
        sched.step(1.0);
        sched.step(2.0);
        let mut opt = SGD::new(0.2, 0.0);
        sched.apply(&mut opt);
        assert_abs_diff_eq!(opt.lr(), 0.1);
    }

    proptest! {
        #[test]
        fn prop_plateau_lr_never_increases_or_drops_below_min(
            metrics in prop::collection::vec(0.0f32..10.0, 1..60),
        ) {
            let mut sched = ReduceLROnPlateau::new(0.01, 0.5, 3, 1e-4, 1e-4);
            let mut prev = sched.get_lr();
            for m in metrics {
                sched.step(m);
                prop_assert!(sched.get_lr() <= prev);
                prop_assert!(sched.get_lr() >= 1e-4);
                prev = sched.get_lr();
            }
        }
    }
}
