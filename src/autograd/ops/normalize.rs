//! Normalization autograd operations: batch_norm
//!
//! Both functions operate on a `rows x cols` matrix and normalize each column
//! (feature) independently.

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array1, Array2, Axis};
use std::cell::RefCell;
use std::rc::Rc;

use super::matmul::view2;

/// Output of a training-mode batch normalization
pub struct BatchNormOutput {
    pub output: Tensor,
    /// Per-column batch mean
    pub mean: Array1<f32>,
    /// Per-column biased batch variance
    pub variance: Array1<f32>,
}

/// Batch normalization using the statistics of the current batch
///
/// y = gamma * (x - mean) / sqrt(var + epsilon) + beta, with the biased
/// variance. Callers update their running statistics from the returned
/// `mean` and `variance`.
pub fn batch_norm(
    x: &Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    rows: usize,
    cols: usize,
    epsilon: f32,
) -> BatchNormOutput {
    let xm = view2(x.data(), rows, cols);
    let mean = xm.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(cols));
    let centered = &xm - &mean;
    let variance = centered.mapv(|v| v * v).mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(cols));
    let inv_std = variance.mapv(|v| 1.0 / (v + epsilon).sqrt());

    let normalized = &centered * &inv_std;
    let out = &normalized * gamma.data() + beta.data();
    let data = Array1::from_iter(out.iter().copied());

    let requires_grad = x.requires_grad() || gamma.requires_grad() || beta.requires_grad();
    let mut output = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BatchNormBackward {
            x: x.clone(),
            gamma: gamma.clone(),
            beta: beta.clone(),
            normalized,
            inv_std,
            rows,
            cols,
            result_grad: output.grad_cell(),
        });
        output.set_backward_op(backward_op);
    }

    BatchNormOutput { output, mean, variance }
}

struct BatchNormBackward {
    x: Tensor,
    gamma: Tensor,
    beta: Tensor,
    normalized: Array2<f32>,
    inv_std: Array1<f32>,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BatchNormBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let dy = view2(grad, self.rows, self.cols);
            let dy_xhat = &dy * &self.normalized;

            if self.beta.requires_grad() {
                self.beta.accumulate_grad(dy.sum_axis(Axis(0)));
            }
            if self.gamma.requires_grad() {
                self.gamma.accumulate_grad(dy_xhat.sum_axis(Axis(0)));
            }
            if self.x.requires_grad() {
                // dx = gamma * inv_std / N * (N*dy - Σdy - x̂ * Σ(dy*x̂))
                let n = self.rows as f32;
                let sum_dy = dy.sum_axis(Axis(0));
                let sum_dy_xhat = dy_xhat.sum_axis(Axis(0));
                let scale = self.gamma.data() * &self.inv_std / n;
                let dx = (&dy * n - &sum_dy - &self.normalized * &sum_dy_xhat) * &scale;
                self.x.accumulate_grad(Array1::from_iter(dx.iter().copied()));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x, &self.gamma, &self.beta]
    }
}

/// Batch normalization with fixed (running) statistics
///
/// An affine map per column; differentiable in `x`, `gamma` and `beta`.
#[allow(clippy::too_many_arguments)]
pub fn batch_norm_inference(
    x: &Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    running_mean: &Array1<f32>,
    running_var: &Array1<f32>,
    rows: usize,
    cols: usize,
    epsilon: f32,
) -> Tensor {
    let inv_std = running_var.mapv(|v| 1.0 / (v + epsilon).sqrt());
    let normalized = (&view2(x.data(), rows, cols) - running_mean) * &inv_std;
    let out = &normalized * gamma.data() + beta.data();
    let data = Array1::from_iter(out.iter().copied());

    let requires_grad = x.requires_grad() || gamma.requires_grad() || beta.requires_grad();
    let mut output = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(FrozenBatchNormBackward {
            x: x.clone(),
            gamma: gamma.clone(),
            beta: beta.clone(),
            normalized,
            inv_std,
            rows,
            cols,
            result_grad: output.grad_cell(),
        });
        output.set_backward_op(backward_op);
    }

    output
}

struct FrozenBatchNormBackward {
    x: Tensor,
    gamma: Tensor,
    beta: Tensor,
    normalized: Array2<f32>,
    inv_std: Array1<f32>,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for FrozenBatchNormBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let dy = view2(grad, self.rows, self.cols);
            if self.beta.requires_grad() {
                self.beta.accumulate_grad(dy.sum_axis(Axis(0)));
            }
            if self.gamma.requires_grad() {
                self.gamma.accumulate_grad((&dy * &self.normalized).sum_axis(Axis(0)));
            }
            if self.x.requires_grad() {
                let dx = &dy * &(self.gamma.data() * &self.inv_std);
                self.x.accumulate_grad(Array1::from_iter(dx.iter().copied()));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x, &self.gamma, &self.beta]
    }
}
