//! Mean Squared Error loss

use super::{scalar_loss, LossFn};
use crate::Tensor;

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)^2)
///
/// # Example
///
/// ```
/// use kerf::train::{LossFn, MSELoss};
/// use kerf::Tensor;
///
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = MSELoss.forward(&pred, &target);
/// assert!((loss.data()[0] - 0.25).abs() < 1e-6);
/// ```
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let diff = predictions.data() - targets.data();
        let mse = (&diff * &diff).mean().unwrap_or(0.0);

        // d(MSE)/d(pred) = 2 * (pred - target) / n
        let n = predictions.len().max(1) as f32;
        scalar_loss(predictions, mse, diff * (2.0 / n))
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}
