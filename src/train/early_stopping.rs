//! Early stopping with best-checkpoint retention

/// Tracks the best validation score and a non-improvement counter
///
/// Lower scores are better. The first score always counts as an improvement.
/// Once stopped, the state never changes again.
#[derive(Clone, Debug)]
pub struct EarlyStopping<C> {
    patience: usize,
    min_delta: f32,
    best_score: Option<f32>,
    best_epoch: Option<usize>,
    counter: usize,
    best_checkpoint: Option<C>,
    stopped: bool,
    epochs_seen: usize,
}

impl<C> EarlyStopping<C> {
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self {
            patience,
            min_delta,
            best_score: None,
            best_epoch: None,
            counter: 0,
            best_checkpoint: None,
            stopped: false,
            epochs_seen: 0,
        }
    }

    /// Record one epoch's score; returns `true` when training should stop
    ///
    /// `snapshot` is only called on improvement and must return an
    /// independent copy of the model state.
    pub fn step<F>(&mut self, score: f32, snapshot: F) -> bool
    where
        F: FnOnce() -> C,
    {
        if self.stopped {
            return true;
        }
        let epoch = self.epochs_seen;
        self.epochs_seen += 1;

        let improved = match self.best_score {
            None => true,
            Some(best) => score < best - self.min_delta,
        };

        if improved {
            self.best_score = Some(score);
            self.best_epoch = Some(epoch);
            self.best_checkpoint = Some(snapshot());
            self.counter = 0;
        } else {
            self.counter += 1;
            if self.counter >= self.patience {
                self.stopped = true;
            }
        }
        self.stopped
    }

    pub fn best_score(&self) -> Option<f32> {
        self.best_score
    }

    /// Zero-based epoch of the best score
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn best_checkpoint(&self) -> Option<&C> {
        self.best_checkpoint.as_ref()
    }

    /// Consume the state, promoting the best checkpoint
    pub fn into_best_checkpoint(self) -> Option<C> {
        self.best_checkpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_score_always_improves() {
        let mut es = EarlyStopping::new(1, 0.0);
        assert!(!es.step(f32::MAX, || 0));
        assert_eq!(es.best_checkpoint(), Some(&0));
        assert_eq!(es.best_epoch(), Some(0));
    }

    #[test]
    fn test_stops_exactly_at_patience() {
        let mut es = EarlyStopping::new(3, 0.001);
        assert!(!es.step(1.0, || "e0"));
        assert!(!es.step(1.0, || "e1"));
        assert!(!es.step(1.0, || "e2"));
        assert!(es.step(1.0, || "e3"));
        assert_eq!(es.counter(), 3);
        assert_eq!(es.best_checkpoint(), Some(&"e0"));
    }

    #[test]
    fn test_improvement_needs_more_than_min_delta() {
        let mut es = EarlyStopping::new(5, 0.1);
        es.step(1.0, || 0);
        es.step(0.95, || 1);
        assert_eq!(es.counter(), 1);
        es.step(0.85, || 2);
        assert_eq!(es.counter(), 0);
        assert_eq!(es.best_score(), Some(0.85));
        assert_eq!(es.into_best_checkpoint(), Some(2));
    }

    #[test]
    fn test_never_unstops() {
        let mut es = EarlyStopping::new(1, 0.0);
        es.step(1.0, || 0);
        assert!(es.step(2.0, || 1));
        assert!(es.step(0.1, || 2));
        assert_eq!(es.best_score(), Some(1.0));
        assert_eq!(es.best_checkpoint(), Some(&0));
    }

    proptest! {
        #[test]
        fn prop_strictly_decreasing_never_stops(
            start in 1.0f32..100.0,
            steps in prop::collection::vec(0.01f32..1.0, 1..60),
            patience in 1usize..10,
        ) {
            let mut es = EarlyStopping::new(patience, 0.0);
            let mut score = start;
            for (i, drop) in steps.iter().enumerate() {
                prop_assert!(!es.step(score, || i));
                score -= drop;
            }
            prop_assert_eq!(es.counter(), 0);
        }

        #[test]
        fn prop_plateau_stops_at_patience(patience in 1usize..20, best in -10.0f32..10.0) {
            let mut es = EarlyStopping::new(patience, 1e-4);
            es.step(best + 1.0, || ());
            es.step(best, || ());
            for i in 1..=patience {
                let stopped = es.step(best, || ());
                prop_assert_eq!(stopped, i == patience);
            }
        }
    }
}
