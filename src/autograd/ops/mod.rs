//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod matmul;
mod normalize;

// Re-export all public operations
pub use activations::{dropout, leaky_relu, relu, sigmoid, sigmoid_scalar};
pub use basic::{add, add_bias, concat_cols, sum};
pub use matmul::{matmul, matmul_compute, transpose};
pub use normalize::{batch_norm, batch_norm_inference, BatchNormOutput};
