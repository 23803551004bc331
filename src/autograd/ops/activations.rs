//! Activation function autograd operations: relu, leaky_relu, sigmoid, dropout

use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Elementwise op whose backward multiplies by a precomputed local derivative
fn elementwise(a: &Tensor, data: Array1<f32>, local_grad: Array1<f32>) -> Tensor {
    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ElementwiseBackward {
            a: a.clone(),
            local_grad,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ElementwiseBackward {
    a: Tensor,
    local_grad: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ElementwiseBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * &self.local_grad);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    // ∂out/∂a = (a > 0)
    let local = a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
    elementwise(a, data, local)
}

/// Leaky ReLU: `x` for positive inputs, `slope * x` otherwise
pub fn leaky_relu(a: &Tensor, slope: f32) -> Tensor {
    let data = a.data().mapv(|x| if x > 0.0 { x } else { slope * x });
    let local = a.data().mapv(|x| if x > 0.0 { 1.0 } else { slope });
    elementwise(a, data, local)
}

/// Logistic sigmoid
pub fn sigmoid(a: &Tensor) -> Tensor {
    let data = a.data().mapv(sigmoid_scalar);
    // σ'(x) = σ(x)(1 - σ(x))
    let local = data.mapv(|s| s * (1.0 - s));
    elementwise(a, data, local)
}

/// Numerically stable scalar sigmoid
pub fn sigmoid_scalar(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverted dropout
///
/// Zeroes each element with probability `p` and scales survivors by
/// `1 / (1 - p)`, so the expected activation is unchanged. `p == 0` is the
/// identity.
pub fn dropout<R: Rng + ?Sized>(a: &Tensor, p: f32, rng: &mut R) -> Tensor {
    assert!((0.0..1.0).contains(&p), "dropout probability must be in [0, 1)");
    if p == 0.0 {
        return elementwise(a, a.data().clone(), Array1::ones(a.len()));
    }

    let keep_scale = 1.0 / (1.0 - p);
    let mask = Array1::from_iter((0..a.len()).map(|_| {
        if rng.random::<f32>() < p {
            0.0
        } else {
            keep_scale
        }
    }));
    let data = a.data() * &mask;
    elementwise(a, data, mask)
}
