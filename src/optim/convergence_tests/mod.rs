//! Optimizer convergence tests on f(x) = Σx²

mod helpers;

use crate::optim::{Adam, SGD};
use helpers::{quadratic_converges, quadratic_loss_decreases};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_adam_converges_quadratic(lr in 0.05f32..0.5) {
        prop_assert!(quadratic_converges(Adam::default_params(lr), 200, 1.5));
    }

    #[test]
    fn prop_sgd_converges_quadratic(lr in 0.05f32..0.4) {
        prop_assert!(quadratic_converges(SGD::new(lr, 0.0), 100, 0.1));
    }

    #[test]
    fn prop_sgd_loss_decreases(lr in 0.01f32..0.4) {
        prop_assert!(quadratic_loss_decreases(SGD::new(lr, 0.0), 30));
    }
}
