//! Loss functions for training
//!
//! - [`MSELoss`] - Mean Squared Error against continuous targets
//! - [`CrossEntropyLoss`] - batched logits against integer class targets

mod cross_entropy;
mod mse;
mod traits;

pub use cross_entropy::CrossEntropyLoss;
pub use mse::MSELoss;
pub use traits::{ClassificationLossFn, LossFn};

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Scalar loss tensor whose backward pushes `grad` (scaled by the incoming
/// gradient) into `predictions`
pub(crate) fn scalar_loss(predictions: &Tensor, value: f32, grad: Array1<f32>) -> Tensor {
    let requires_grad = predictions.requires_grad();
    let mut loss = Tensor::from_vec(vec![value], requires_grad);

    if requires_grad {
        loss.set_backward_op(Rc::new(LossBackward {
            predictions: predictions.clone(),
            grad,
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

struct LossBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for LossBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.predictions]
    }
}
