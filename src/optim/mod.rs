//! Optimizers for training neural networks

mod adam;
mod clip;
mod optimizer;
mod scheduler;
mod sgd;

#[cfg(test)]
mod convergence_tests;

pub use adam::Adam;
pub use clip::clip_grad_norm_refs;
pub use optimizer::Optimizer;
pub use scheduler::{LRScheduler, ReduceLROnPlateau};
pub use sgd::SGD;
