//! Tape-based autograd engine
//!
//! Tensors are flat `Array1<f32>` buffers; matrix shapes are passed to the
//! operations explicitly (row-major `rows x cols`). Every differentiable
//! operation attaches a [`BackwardOp`] to its output and [`backward`] walks
//! the resulting graph in reverse topological order.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use ops::*;
pub use tensor::Tensor;
