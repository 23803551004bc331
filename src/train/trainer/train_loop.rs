//! Multi-epoch training loop

use super::core::Trainer;
use super::result::TrainOutcome;
use crate::data::Dataset;
use crate::models::TabularModel;
use crate::train::callback::{CallbackAction, CallbackContext};
use crate::train::{EarlyStopping, TrainingHistory};
use crate::{Error, Result};
use std::time::Instant;

impl Trainer {
    /// Train `model` in place and restore its best validation checkpoint
    ///
    /// Each epoch runs a shuffled training pass and a validation pass, then
    /// records history (with the rate the epoch ran at), steps the scheduler
    /// on the validation loss and feeds it to early stopping. A stop signal
    /// ends the loop immediately.
    pub fn train(&mut self, model: &mut dyn TabularModel, train: &Dataset, val: &Dataset) -> Result<TrainOutcome> {
        self.config.validate()?;
        if train.is_empty() || val.is_empty() {
            return Err(Error::Training(format!(
                "need non-empty splits, got {} train and {} validation rows",
                train.len(),
                val.len()
            )));
        }
        for split in [train, val] {
            if split.n_features() != model.input_arity() {
                return Err(Error::Config(format!(
                    "model expects {} features but the table has {}",
                    model.input_arity(),
                    split.n_features()
                )));
            }
        }

        let start = Instant::now();
        let max_epochs = self.config.max_epochs;
        let mut history = TrainingHistory::new();
        let mut early_stopping = EarlyStopping::new(self.config.patience, self.config.min_delta);
        let mut stopped_early = false;

        tracing::info!(
            train_rows = train.len(),
            val_rows = val.len(),
            parameters = model.parameter_count(),
            loss = self.objective.name(),
            max_epochs,
            "starting training"
        );
        self.callbacks.on_train_begin(&CallbackContext { max_epochs, lr: self.lr(), ..Default::default() });

        let mut last_ctx = CallbackContext::default();
        for epoch in 0..max_epochs {
            let lr = self.optimizer.lr();
            let train_loss = self.train_epoch(model, train, epoch)?;
            let val_loss = self.validate(model, val)?;
            if !val_loss.is_finite() {
                return Err(Error::Training(format!("validation loss diverged at epoch {}", epoch + 1)));
            }

            history.record(train_loss, val_loss, lr);
            self.scheduler.step(val_loss);
            self.scheduler.apply(self.optimizer.as_mut());
            let stop = early_stopping.step(val_loss, || model.state_dict());

            tracing::debug!(
                epoch = epoch + 1,
                train_loss,
                val_loss,
                lr,
                patience_counter = early_stopping.counter(),
                "epoch finished"
            );

            last_ctx = CallbackContext {
                epoch,
                max_epochs,
                train_loss,
                val_loss,
                lr,
                best_score: early_stopping.best_score(),
                elapsed_secs: start.elapsed().as_secs_f64(),
            };

            if stop {
                tracing::info!(epoch = epoch + 1, "early stopping triggered");
                stopped_early = true;
                break;
            }
            if self.callbacks.on_epoch_end(&last_ctx) == CallbackAction::Stop {
                break;
            }
        }

        if let Some(best) = early_stopping.best_checkpoint() {
            model.load_state_dict(best)?;
        }
        model.set_training(false);
        self.callbacks.on_train_end(&last_ctx);

        Ok(TrainOutcome {
            epochs_run: history.len(),
            history,
            best_score: early_stopping.best_score(),
            best_epoch: early_stopping.best_epoch(),
            stopped_early,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::autograd::{matmul, Tensor};
    use crate::data::{Dataset, Labels};
    use crate::determinism::DeterministicContext;
    use crate::io::{ModelGraph, Node};
    use crate::models::{Activation, FeedForwardNet, LayerSpec, StateDict, TabularModel};
    use crate::optim::{Adam, Optimizer};
    use crate::train::callback::{CallbackAction, CallbackContext, TrainerCallback};
    use crate::train::{MSELoss, Objective, TrainConfig, Trainer};
    use crate::{Error, Result};
    use ndarray::{array, Array2};

    /// Predicts its single parameter for every row
    struct Constant {
        p: Tensor,
        training: bool,
    }

    impl TabularModel for Constant {
        fn input_arity(&self) -> usize {
            1
        }
        fn output_arity(&self) -> usize {
            1
        }
        fn parameter_count(&self) -> usize {
            1
        }
        fn forward(&mut self, _input: &Tensor, batch: usize) -> Tensor {
            matmul(&Tensor::ones(batch, false), &self.p, batch, 1, 1)
        }
        fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
            vec![&mut self.p]
        }
        fn set_training(&mut self, training: bool) {
            self.training = training;
        }
        fn is_training(&self) -> bool {
            self.training
        }
        fn state_dict(&self) -> StateDict {
            StateDict::from([("p".to_string(), self.p.data().clone())])
        }
        fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
            let p = state.get("p").ok_or_else(|| Error::Artifact("missing p".into()))?;
            *self.p.data_mut() = p.clone();
            Ok(())
        }
        fn to_graph(&self) -> ModelGraph {
            ModelGraph::new(1, 1, vec![Node::Gemm { inputs: 1, outputs: 1, weight: vec![0.0], bias: self.p.data().to_vec() }])
        }
    }

    /// Ignores gradients and sets the parameter to the next scripted value
    struct Scripted {
        values: Vec<f32>,
        steps: usize,
        lr: f32,
    }

    impl Optimizer for Scripted {
        fn step_refs(&mut self, params: &mut [&mut Tensor]) {
            let value = self.values[self.steps.min(self.values.len() - 1)];
            self.steps += 1;
            params[0].data_mut().fill(value);
        }
        fn lr(&self) -> f32 {
            self.lr
        }
        fn set_lr(&mut self, lr: f32) {
            self.lr = lr;
        }
    }

    fn zeros_dataset(rows: usize) -> Dataset {
        Dataset::new(Array2::zeros((rows, 1)), Labels::Continuous(Array2::zeros((rows, 1)))).expect("aligned")
    }

    fn regression_tables() -> (Dataset, Dataset) {
        let make = |offset: f32| {
            let x = Array2::from_shape_fn((48, 2), |(r, c)| ((r as f32 + offset) * 0.37 + c as f32).sin());
            let y = Array2::from_shape_fn((48, 1), |(r, _)| 0.3 * x[[r, 0]] - 0.2 * x[[r, 1]] + 0.5);
            Dataset::new(x, Labels::Continuous(y)).expect("aligned")
        };
        (make(0.0), make(100.0))
    }

    fn small_net(seed: u64) -> FeedForwardNet {
        let specs = [LayerSpec::Linear(8), LayerSpec::Activation(Activation::Relu), LayerSpec::Linear(1)];
        FeedForwardNet::new(2, &specs, &DeterministicContext::new(seed)).expect("valid")
    }

    #[test]
    fn test_best_checkpoint_restored_after_late_regression() {
        // Validation loss per epoch is p^2: 0.25, 0.04, 0.81, 0.64, 0.49
        let mut model = Constant { p: Tensor::from_vec(vec![1.0], true), training: true };
        let optimizer = Scripted { values: vec![0.5, 0.2, 0.9, 0.8, 0.7, 0.6], steps: 0, lr: 0.1 };
        let config = TrainConfig::new().with_max_epochs(50).with_early_stopping(3, 1e-4).with_batch_size(32);
        let mut trainer = Trainer::new(Objective::Regression(Box::new(MSELoss)), Box::new(optimizer), config);

        let outcome = trainer.train(&mut model, &zeros_dataset(4), &zeros_dataset(4)).expect("trains");

        assert!(outcome.stopped_early);
        assert_eq!(outcome.epochs_run, 5);
        assert_eq!(outcome.best_epoch, Some(1));
        assert!((model.p.data()[0] - 0.2).abs() < 1e-6);
        assert!(!model.is_training());
    }

    #[test]
    fn test_history_records_rate_before_scheduler_step() {
        let mut model = Constant { p: Tensor::from_vec(vec![1.0], true), training: true };
        let optimizer = Scripted { values: vec![0.5], steps: 0, lr: 0.1 };
        let config = TrainConfig::new()
            .with_max_epochs(4)
            .with_early_stopping(100, 0.0)
            .with_plateau(0.5, 0, 1e-6);
        let mut trainer = Trainer::new(Objective::Regression(Box::new(MSELoss)), Box::new(optimizer), config);

        let outcome = trainer.train(&mut model, &zeros_dataset(2), &zeros_dataset(2)).expect("trains");
        let rates: Vec<f32> = outcome.history.iter().map(|e| e.learning_rate).collect();
        // Epoch 0 sets the best; every later epoch is a plateau with patience 0
        assert_eq!(rates, vec![0.1, 0.1, 0.05, 0.025]);
    }

    #[test]
    fn test_real_network_learns_and_is_reproducible() {
        let (train, val) = regression_tables();
        let run = || {
            let mut model = small_net(3);
            let config = TrainConfig::new().with_max_epochs(30).with_batch_size(8).with_lr(0.01);
            let mut trainer =
                Trainer::new(Objective::Regression(Box::new(MSELoss)), Box::new(Adam::default_params(0.01)), config);
            let outcome = trainer.train(&mut model, &train, &val).expect("trains");
            (outcome, model.state_dict())
        };

        let (first, state_a) = run();
        let (_, state_b) = run();
        assert_eq!(state_a, state_b);

        let losses: Vec<f32> = first.history.iter().map(|e| e.val_loss).collect();
        let best = first.best_score.expect("at least one epoch");
        assert!(best < losses[0], "validation loss never improved: {losses:?}");
    }

    #[test]
    fn test_callback_stop_ends_run() {
        struct StopAfterTwo;
        impl TrainerCallback for StopAfterTwo {
            fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
                if ctx.epoch >= 1 {
                    CallbackAction::Stop
                } else {
                    CallbackAction::Continue
                }
            }
        }

        let (train, val) = regression_tables();
        let mut model = small_net(1);
        let mut trainer = Trainer::new(
            Objective::Regression(Box::new(MSELoss)),
            Box::new(Adam::default_params(0.001)),
            TrainConfig::new().with_max_epochs(20),
        );
        trainer.add_callback(StopAfterTwo);
        let outcome = trainer.train(&mut model, &train, &val).expect("trains");
        assert_eq!(outcome.epochs_run, 2);
        assert!(!outcome.stopped_early);
    }

    #[test]
    fn test_feature_width_mismatch_rejected() {
        let mut model = small_net(1);
        let narrow = Dataset::new(array![[1.0], [2.0]], Labels::Continuous(array![[0.0], [1.0]])).expect("aligned");
        let mut trainer = Trainer::new(
            Objective::Regression(Box::new(MSELoss)),
            Box::new(Adam::default_params(0.001)),
            TrainConfig::default(),
        );
        assert!(matches!(trainer.train(&mut model, &narrow, &narrow), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_validation_split_rejected() {
        let mut model = small_net(1);
        let (train, _) = regression_tables();
        let empty = Dataset::new(Array2::zeros((0, 2)), Labels::Continuous(Array2::zeros((0, 1)))).expect("aligned");
        let mut trainer = Trainer::new(
            Objective::Regression(Box::new(MSELoss)),
            Box::new(Adam::default_params(0.001)),
            TrainConfig::default(),
        );
        assert!(matches!(trainer.train(&mut model, &train, &empty), Err(Error::Training(_))));
    }
}
