//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self { lr, momentum, velocities: Vec::new() }
    }
}

impl Optimizer for SGD {
    fn step_refs(&mut self, params: &mut [&mut Tensor]) {
        if self.velocities.len() < params.len() {
            self.velocities.resize(params.len(), None);
        }

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else { continue };

            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - &grad * self.lr,
                    None => &grad * (-self.lr),
                };
                *param.data_mut() += &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                *param.data_mut() -= &(grad * self.lr);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_sgd_plain_update() {
        let mut opt = SGD::new(0.1, 0.0);
        let mut p = Tensor::from_vec(vec![1.0, 2.0], true);
        p.set_grad(arr1(&[0.5, 1.0]));

        opt.step_refs(&mut [&mut p]);

        assert_abs_diff_eq!(p.data()[0], 0.95, epsilon = 1e-6);
        assert_abs_diff_eq!(p.data()[1], 1.9, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_momentum_accumulates() {
        let mut opt = SGD::new(0.1, 0.9);
        let mut p = Tensor::from_vec(vec![0.0], true);
        p.set_grad(arr1(&[1.0]));
        opt.step_refs(&mut [&mut p]);
        opt.step_refs(&mut [&mut p]);

        // -0.1, then -(0.09 + 0.1)
        assert_abs_diff_eq!(p.data()[0], -0.29, epsilon = 1e-6);
    }
}
