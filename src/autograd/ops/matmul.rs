//! Matrix multiplication autograd operations

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array1, ArrayView2};
use std::cell::RefCell;
use std::rc::Rc;

/// View a flat buffer as a row-major `rows x cols` matrix
///
/// Panics if the buffer length does not match, which is a caller bug.
pub(crate) fn view2(data: &Array1<f32>, rows: usize, cols: usize) -> ArrayView2<'_, f32> {
    data.view()
        .into_shape_with_order((rows, cols))
        .unwrap_or_else(|e| panic!("cannot view {} values as {rows}x{cols}: {e}", data.len()))
}

/// Compute C = A @ B on flat row-major buffers
pub fn matmul_compute(a: &Array1<f32>, b: &Array1<f32>, m: usize, k: usize, n: usize) -> Array1<f32> {
    let c = view2(a, m, k).dot(&view2(b, k, n));
    Array1::from_iter(c.iter().copied())
}

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
pub fn transpose(data: &Array1<f32>, rows: usize, cols: usize) -> Array1<f32> {
    Array1::from_iter(view2(data, rows, cols).t().iter().copied())
}

/// Matrix multiplication
///
/// Computes C = A @ B where:
/// - A is m×k (flattened to length m*k)
/// - B is k×n (flattened to length k*n)
/// - C is m×n (flattened to length m*n)
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let result_data = matmul_compute(a.data(), b.data(), m, k, n);

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(result_data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad_c) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C @ B^T  (m×n) @ (n×k)
                let b_t = transpose(self.b.data(), self.k, self.n);
                self.a.accumulate_grad(matmul_compute(grad_c, &b_t, self.m, self.n, self.k));
            }

            if self.b.requires_grad() {
                // ∂L/∂B = A^T @ ∂L/∂C  (k×m) @ (m×n)
                let a_t = transpose(self.a.data(), self.m, self.k);
                self.b.accumulate_grad(matmul_compute(&a_t, grad_c, self.k, self.m, self.n));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_transpose_2x3() {
        let data = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = transpose(&data, 2, 3);
        assert_eq!(result.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_matmul_compute_2x2() {
        let a = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let b = arr1(&[5.0, 6.0, 7.0, 8.0]);
        let c = matmul_compute(&a, &b, 2, 2, 2);
        assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    #[should_panic(expected = "Matrix A size mismatch")]
    fn test_matmul_rejects_bad_shape() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        let b = Tensor::from_vec(vec![1.0, 2.0], false);
        let _ = matmul(&a, &b, 2, 2, 1);
    }
}
