//! Training step operations

use super::core::Trainer;
use crate::autograd::backward;
use crate::models::TabularModel;
use crate::optim::clip_grad_norm_refs;
use crate::train::Batch;
use crate::{Error, Result};

impl Trainer {
    /// One optimizer update on `batch`; returns the batch loss
    ///
    /// zero grad → forward → loss → backward → clip → step
    pub fn train_step(&mut self, model: &mut dyn TabularModel, batch: &Batch) -> Result<f32> {
        self.optimizer.zero_grad_refs(&mut model.parameters_mut());

        let predictions = model.forward(&batch.inputs, batch.rows);
        let loss = self.objective.loss(&predictions, &batch.labels, batch.rows, model.output_arity())?;
        let value = loss.data()[0];
        if !value.is_finite() {
            return Err(Error::Training(format!("training loss diverged ({value})")));
        }

        backward(&loss, None);

        let mut params = model.parameters_mut();
        if let Some(max_norm) = self.config.max_grad_norm {
            clip_grad_norm_refs(&mut params, max_norm);
        }
        self.optimizer.step_refs(&mut params);

        Ok(value)
    }

    /// Batch loss without any parameter update
    pub fn eval_step(&self, model: &mut dyn TabularModel, batch: &Batch) -> Result<f32> {
        let predictions = model.forward(&batch.inputs.detach(), batch.rows);
        let loss = self.objective.loss(&predictions, &batch.labels, batch.rows, model.output_arity())?;
        Ok(loss.data()[0])
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{Dataset, Labels};
    use crate::determinism::DeterministicContext;
    use crate::models::{Activation, FeedForwardNet, LayerSpec, TabularModel};
    use crate::optim::SGD;
    use crate::train::{Batch, MSELoss, Objective, TrainConfig, Trainer};
    use crate::Error;
    use ndarray::array;

    fn net() -> FeedForwardNet {
        let specs = [LayerSpec::Linear(3), LayerSpec::Activation(Activation::Relu), LayerSpec::Linear(1)];
        FeedForwardNet::new(2, &specs, &DeterministicContext::new(11)).expect("valid")
    }

    fn batch() -> Batch {
        let ds = Dataset::new(
            array![[1.0, 0.5], [-0.5, 2.0], [0.0, 1.0]],
            Labels::Continuous(array![[1.0], [0.0], [0.5]]),
        )
        .expect("aligned");
        Batch::from_dataset(&ds)
    }

    fn trainer() -> Trainer {
        Trainer::new(Objective::Regression(Box::new(MSELoss)), Box::new(SGD::new(0.05, 0.0)), TrainConfig::default())
    }

    #[test]
    fn test_train_step_reduces_batch_loss() {
        let mut model = net();
        let mut trainer = trainer();
        let batch = batch();
        let first = trainer.train_step(&mut model, &batch).expect("finite loss");
        for _ in 0..50 {
            trainer.train_step(&mut model, &batch).expect("finite loss");
        }
        let last = trainer.eval_step(&mut model, &batch).expect("finite loss");
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn test_eval_step_leaves_parameters_untouched() {
        let mut model = net();
        let trainer = trainer();
        let before = model.state_dict();
        trainer.eval_step(&mut model, &batch()).expect("finite loss");
        assert_eq!(model.state_dict(), before);
    }

    /// L2 norm of the parameter change made by one step on a far-off target
    fn step_delta_norm(max_grad_norm: Option<f32>) -> f32 {
        let mut model = net();
        let config = TrainConfig::default().with_grad_clip(max_grad_norm);
        let mut trainer =
            Trainer::new(Objective::Regression(Box::new(MSELoss)), Box::new(SGD::new(1.0, 0.0)), config);
        let mut far = batch();
        far.labels = Labels::Continuous(array![[1.0e4], [1.0e4], [1.0e4]]);

        let before = model.state_dict();
        trainer.train_step(&mut model, &far).expect("finite loss");
        let after = model.state_dict();
        before
            .iter()
            .map(|(key, old)| (&after[key] - old).mapv(|d| d * d).sum())
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn test_gradients_clipped_before_update() {
        let clipped = step_delta_norm(Some(1.0));
        assert!(clipped <= 1.0 + 1e-4, "clipped update norm {clipped}");
        assert!(clipped > 0.5, "update should reach the clip norm, got {clipped}");

        let unclipped = step_delta_norm(None);
        assert!(unclipped > 1.0, "unclipped update norm {unclipped}");
    }

    #[test]
    fn test_divergent_loss_is_training_error() {
        let mut model = net();
        let mut trainer = trainer();
        let mut bad = batch();
        bad.labels = Labels::Continuous(array![[f32::INFINITY], [0.0], [0.0]]);
        assert!(matches!(trainer.train_step(&mut model, &bad), Err(Error::Training(_))));
    }
}
