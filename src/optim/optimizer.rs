//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from a model as `&mut Tensor`, always in the same
/// order, so per-parameter state can be kept by position.
pub trait Optimizer {
    /// Perform a single optimization step using the current gradients
    fn step_refs(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad_refs(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    struct FixedStep {
        learning_rate: f32,
    }

    impl Optimizer for FixedStep {
        fn step_refs(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad() {
                    *param.data_mut() -= &(grad * self.learning_rate);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn test_optimizer_zero_grad_refs() {
        let mut opt = FixedStep { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        param.set_grad(arr1(&[0.5, 1.0, 1.5]));

        opt.zero_grad_refs(&mut [&mut param]);
        assert!(param.grad().is_none());
    }

    #[test]
    fn test_optimizer_set_lr() {
        let mut opt = FixedStep { learning_rate: 0.1 };
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }
}
