//! Loss function traits

use crate::Tensor;

/// Loss against continuous targets of the same length as the predictions
pub trait LossFn {
    /// Scalar loss with a backward op into `predictions`
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    fn name(&self) -> &'static str;
}

/// Loss of row-major `rows x classes` logits against one class index per row
pub trait ClassificationLossFn {
    fn forward(&self, logits: &Tensor, targets: &[usize], classes: usize) -> Tensor;

    fn name(&self) -> &'static str;
}
