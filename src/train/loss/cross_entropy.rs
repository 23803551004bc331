//! Cross Entropy Loss for classification

use super::{scalar_loss, ClassificationLossFn};
use crate::Tensor;
use ndarray::{Array1, ArrayView1};

/// Softmax cross entropy averaged over rows
///
/// L = -mean_r(log(softmax(logits_r)[target_r]))
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Compute softmax: exp(x_i) / sum(exp(x_j))
    pub(crate) fn softmax(x: ArrayView1<'_, f32>) -> Array1<f32> {
        let max = x.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp_x: Array1<f32> = x.mapv(|v| (v - max).exp());
        let sum: f32 = exp_x.sum();
        exp_x / sum
    }
}

impl ClassificationLossFn for CrossEntropyLoss {
    fn forward(&self, logits: &Tensor, targets: &[usize], classes: usize) -> Tensor {
        let rows = targets.len();
        assert_eq!(logits.len(), rows * classes, "logits must be rows x classes");

        let mut grad = Array1::<f32>::zeros(logits.len());
        let mut total = 0.0f32;
        let scale = 1.0 / rows.max(1) as f32;

        for (r, &target) in targets.iter().enumerate() {
            assert!(target < classes, "class index {target} out of range");
            let span = r * classes..(r + 1) * classes;
            let probs = Self::softmax(logits.data().slice(ndarray::s![span.clone()]));
            total -= probs[target].max(f32::MIN_POSITIVE).ln();

            // d(CE)/d(logits) = probs - one_hot(target)
            let mut row_grad = grad.slice_mut(ndarray::s![span]);
            row_grad.assign(&(&probs * scale));
            row_grad[target] -= scale;
        }

        scalar_loss(logits, total * scale, grad)
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;

    #[test]
    fn test_softmax() {
        let x = Array1::from(vec![1.0, 2.0, 3.0]);
        let probs = CrossEntropyLoss::softmax(x.view());

        let sum: f32 = probs.sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        for &p in &probs {
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_uniform_logits_give_log_classes() {
        let logits = Tensor::from_vec(vec![0.0; 6], true);
        let loss = CrossEntropyLoss.forward(&logits, &[0, 2], 3);
        assert_relative_eq!(loss.data()[0], 3.0f32.ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_gradient_rows_sum_to_zero() {
        let logits = Tensor::from_vec(vec![2.0, 1.0, 0.5, -1.0, 0.0, 3.0], true);
        let loss = CrossEntropyLoss.forward(&logits, &[0, 1], 3);
        backward(&loss, None);

        let grad = logits.grad().expect("gradient should be available");
        assert_relative_eq!(grad[0] + grad[1] + grad[2], 0.0, epsilon = 1e-6);
        assert_relative_eq!(grad[3] + grad[4] + grad[5], 0.0, epsilon = 1e-6);
        // Target logits are pushed up
        assert!(grad[0] < 0.0);
        assert!(grad[4] < 0.0);
    }

    #[test]
    fn test_confident_correct_prediction_has_small_loss() {
        let logits = Tensor::from_vec(vec![10.0, -10.0, -10.0], false);
        let loss = CrossEntropyLoss.forward(&logits, &[0], 3);
        assert!(loss.data()[0] < 1e-3);
    }
}
