//! Unit tests for autograd operations (forward and backward)

use super::test_utils::{finite_difference, weighted_sum, weights};
use crate::autograd::{
    add, add_bias, backward, batch_norm, batch_norm_inference, concat_cols, leaky_relu, matmul,
    relu, sigmoid, sum, Tensor,
};
use approx::assert_abs_diff_eq;
use ndarray::{arr1, Array1};

#[test]
fn test_tensor_grad_accumulation() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);

    t.accumulate_grad(arr1(&[1.0, 1.0, 1.0]));
    t.accumulate_grad(arr1(&[1.0, 1.0, 1.0]));
    let grad = t.grad().expect("gradient should be available");
    assert_eq!(grad[0], 2.0);
}

#[test]
fn test_add_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], true);
    let c = add(&a, &b);

    backward(&c, None);

    assert_abs_diff_eq!(a.grad().expect("gradient should be available")[0], 1.0);
    assert_abs_diff_eq!(b.grad().expect("gradient should be available")[2], 1.0);
}

#[test]
fn test_shared_input_receives_both_paths_once() {
    // y = sum(relu(x)) + sum(x): a diamond over `x`
    let x = Tensor::from_vec(vec![1.0, -1.0], true);
    let h = relu(&x);
    let y = add(&sum(&h), &sum(&x));

    backward(&y, None);

    let grad = x.grad().expect("gradient should be available");
    assert_abs_diff_eq!(grad[0], 2.0);
    assert_abs_diff_eq!(grad[1], 1.0);
}

#[test]
fn test_shared_trunk_not_double_counted() {
    // Two heads over one trunk, like a multi-output model
    let w = Tensor::from_vec(vec![2.0], true);
    let x = Tensor::from_vec(vec![3.0], false);
    let trunk = matmul(&x, &w, 1, 1, 1);
    let head_a = relu(&trunk);
    let head_b = sigmoid(&trunk);
    let out = concat_cols(&[&head_a, &head_b], &[1, 1], 1);

    backward(&out, None);

    let s = 1.0 / (1.0 + (-6.0f32).exp());
    let expected = 3.0 * (1.0 + s * (1.0 - s));
    assert_abs_diff_eq!(w.grad().expect("gradient should be available")[0], expected, epsilon = 1e-5);
}

#[test]
fn test_matmul_forward_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
    let b = Tensor::from_vec(vec![5.0, 6.0, 7.0, 8.0], true);
    let c = matmul(&a, &b, 2, 2, 2);

    assert_eq!(c.data().to_vec(), vec![19.0, 22.0, 43.0, 50.0]);

    backward(&c, None);
    // grad_A = ones @ B^T: row sums of B
    let grad_a = a.grad().expect("gradient should be available");
    assert_abs_diff_eq!(grad_a[0], 11.0);
    assert_abs_diff_eq!(grad_a[1], 15.0);
    // grad_B = A^T @ ones: column sums of A
    let grad_b = b.grad().expect("gradient should be available");
    assert_abs_diff_eq!(grad_b[0], 4.0);
    assert_abs_diff_eq!(grad_b[2], 6.0);
}

#[test]
fn test_add_bias_broadcasts_and_sums_columns() {
    let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], true);
    let bias = Tensor::from_vec(vec![10.0, 20.0], true);
    let y = add_bias(&x, &bias, 3, 2);

    assert_eq!(y.data().to_vec(), vec![11.0, 22.0, 13.0, 24.0, 15.0, 26.0]);

    backward(&y, None);
    assert_eq!(bias.grad().expect("gradient should be available").to_vec(), vec![3.0, 3.0]);
}

#[test]
fn test_concat_cols_layout_and_split_gradient() {
    let a = Tensor::from_vec(vec![1.0, 2.0], true);
    let b = Tensor::from_vec(vec![3.0, 4.0, 5.0, 6.0], true);
    let c = concat_cols(&[&a, &b], &[1, 2], 2);

    assert_eq!(c.data().to_vec(), vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);

    backward(&c, Some(arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])));
    assert_eq!(a.grad().expect("gradient should be available").to_vec(), vec![1.0, 4.0]);
    assert_eq!(b.grad().expect("gradient should be available").to_vec(), vec![2.0, 3.0, 5.0, 6.0]);
}

#[test]
fn test_leaky_relu_gradient_slope() {
    let x = Tensor::from_vec(vec![-1.0, 2.0], true);
    let y = leaky_relu(&x, 0.1);
    backward(&y, None);
    let grad = x.grad().expect("gradient should be available");
    assert_abs_diff_eq!(grad[0], 0.1);
    assert_abs_diff_eq!(grad[1], 1.0);
}

#[test]
fn test_batch_norm_normalizes_columns() {
    let x = Tensor::from_vec(vec![1.0, 10.0, 3.0, 20.0, 5.0, 30.0], false);
    let gamma = Tensor::ones(2, true);
    let beta = Tensor::zeros(2, true);
    let bn = batch_norm(&x, &gamma, &beta, 3, 2, 1e-5);

    assert_abs_diff_eq!(bn.mean[0], 3.0);
    assert_abs_diff_eq!(bn.mean[1], 20.0);
    // Biased variance
    assert_abs_diff_eq!(bn.variance[0], 8.0 / 3.0, epsilon = 1e-5);

    let out = bn.output.data();
    let col0: f32 = out[0] + out[2] + out[4];
    assert_abs_diff_eq!(col0, 0.0, epsilon = 1e-5);
}

#[test]
fn test_batch_norm_input_gradient_matches_finite_difference() {
    let x_vals = vec![0.5, -1.0, 2.0, 0.3, -0.7, 1.1, 1.5, 0.2, -0.4];
    let gamma_vals = vec![1.2, 0.8, 1.0];
    let beta_vals = vec![0.1, -0.1, 0.0];

    let x = Tensor::from_vec(x_vals.clone(), true);
    let gamma = Tensor::from_vec(gamma_vals.clone(), true);
    let beta = Tensor::from_vec(beta_vals.clone(), true);
    let bn = batch_norm(&x, &gamma, &beta, 3, 3, 1e-5);
    backward(&bn.output, Some(weights(9)));
    let analytical = x.grad().expect("gradient should be available");

    let numerical = finite_difference(
        |probe| {
            let t = Tensor::from_vec(probe.to_vec(), false);
            let g = Tensor::from_vec(gamma_vals.clone(), false);
            let b = Tensor::from_vec(beta_vals.clone(), false);
            weighted_sum(batch_norm(&t, &g, &b, 3, 3, 1e-5).output.data())
        },
        &x_vals,
        1e-3,
    );

    for (a, n) in analytical.iter().zip(&numerical) {
        assert_abs_diff_eq!(*a, *n, epsilon = 2e-2);
    }
}

#[test]
fn test_batch_norm_inference_uses_running_stats() {
    let x = Tensor::from_vec(vec![4.0, 4.0], false);
    let gamma = Tensor::ones(1, false);
    let beta = Tensor::zeros(1, false);
    let mean = Array1::from(vec![2.0]);
    let var = Array1::from(vec![4.0]);
    let out = batch_norm_inference(&x, &gamma, &beta, &mean, &var, 2, 1, 0.0);
    assert_abs_diff_eq!(out.data()[0], 1.0);
    assert_abs_diff_eq!(out.data()[1], 1.0);
}
