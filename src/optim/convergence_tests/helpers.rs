//! Shared helpers for optimizer convergence tests

use crate::optim::Optimizer;
use crate::Tensor;

/// Run `iterations` steps on f(x) = Σx² and check every coordinate is near 0
pub fn quadratic_converges<O: Optimizer>(mut optimizer: O, iterations: usize, threshold: f32) -> bool {
    let mut param = Tensor::from_vec(vec![3.0, -2.0, 1.5, -2.5], true);

    for _ in 0..iterations {
        let grad = param.data().mapv(|x| 2.0 * x);
        param.set_grad(grad);
        optimizer.step_refs(&mut [&mut param]);
    }

    param.data().iter().all(|&val| val.abs() < threshold)
}

/// Check the loss on f(x) = x² never rises noticeably
pub fn quadratic_loss_decreases<O: Optimizer>(mut optimizer: O, iterations: usize) -> bool {
    let mut param = Tensor::from_vec(vec![10.0], true);
    let mut prev_loss = f32::INFINITY;

    for _ in 0..iterations {
        let x = param.data()[0];
        let loss = x * x;
        if loss > prev_loss + 1e-3 {
            return false;
        }
        prev_loss = loss;
        param.set_grad(ndarray::arr1(&[2.0 * x]));
        optimizer.step_refs(&mut [&mut param]);
    }

    true
}
