//! Basic autograd operations: add, bias broadcast, column concatenation

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{s, Array1, Array2, Axis};
use std::cell::RefCell;
use std::rc::Rc;

use super::matmul::view2;

/// Add two tensors
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    let data = a.data() + b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad.clone());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

/// Add a per-column bias to every row of a `rows x cols` matrix
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(bias.len(), cols, "bias length must equal column count");

    let mut out = view2(x.data(), rows, cols).to_owned();
    out += &view2(bias.data(), 1, cols);
    let data = Array1::from_iter(out.iter().copied());

    let requires_grad = x.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            x: x.clone(),
            bias: bias.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad.clone());
            }
            if self.bias.requires_grad() {
                // ∂L/∂bias = column sums of ∂L/∂out
                let col_sums = view2(grad, self.rows, self.cols).sum_axis(Axis(0));
                self.bias.accumulate_grad(col_sums);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x, &self.bias]
    }
}

/// Concatenate `rows`-row matrices side by side
///
/// `widths[i]` is the column count of `parts[i]`.
pub fn concat_cols(parts: &[&Tensor], widths: &[usize], rows: usize) -> Tensor {
    assert_eq!(parts.len(), widths.len(), "one width per part");

    let total: usize = widths.iter().sum();
    let mut out = Array2::<f32>::zeros((rows, total));
    let mut offset = 0;
    for (part, &w) in parts.iter().zip(widths) {
        out.slice_mut(s![.., offset..offset + w]).assign(&view2(part.data(), rows, w));
        offset += w;
    }
    let data = Array1::from_iter(out.iter().copied());

    let requires_grad = parts.iter().any(|p| p.requires_grad());
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConcatBackward {
            parts: parts.iter().map(|p| (*p).clone()).collect(),
            widths: widths.to_vec(),
            rows,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConcatBackward {
    parts: Vec<Tensor>,
    widths: Vec<usize>,
    rows: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let total: usize = self.widths.iter().sum();
            let grad = view2(grad, self.rows, total);
            let mut offset = 0;
            for (part, &w) in self.parts.iter().zip(&self.widths) {
                if part.requires_grad() {
                    let slice = grad.slice(s![.., offset..offset + w]);
                    part.accumulate_grad(Array1::from_iter(slice.iter().copied()));
                }
                offset += w;
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        self.parts.iter().collect()
    }
}

/// Sum all elements to a scalar tensor
pub fn sum(a: &Tensor) -> Tensor {
    let data = Array1::from(vec![a.data().sum()]);
    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SumBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SumBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(Array1::from_elem(self.a.len(), grad[0]));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}
