//! Test utilities for gradient checking

use ndarray::Array1;

/// Central-difference numerical gradient of `f` at `x`
pub fn finite_difference<F>(f: F, x: &[f32], epsilon: f32) -> Vec<f32>
where
    F: Fn(&[f32]) -> f32,
{
    let mut probe = x.to_vec();
    (0..x.len())
        .map(|i| {
            probe[i] = x[i] + epsilon;
            let up = f(&probe);
            probe[i] = x[i] - epsilon;
            let down = f(&probe);
            probe[i] = x[i];
            (up - down) / (2.0 * epsilon)
        })
        .collect()
}

/// Fixed, non-uniform weights so weighted sums have non-trivial gradients
pub fn weights(len: usize) -> Array1<f32> {
    Array1::from_iter((0..len).map(|i| 0.3 + 0.17 * ((i * 7) % 11) as f32))
}

/// Weighted sum of a tensor's data
pub fn weighted_sum(data: &Array1<f32>) -> f32 {
    (data * &weights(data.len())).sum()
}
