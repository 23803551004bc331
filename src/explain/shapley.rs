//! Monte-Carlo permutation Shapley estimator
//!
//! Each sample draws one background row and one feature permutation, then
//! walks the permutation switching features from the background value to
//! the explained value. The marginal change in output at each switch is
//! credited to that feature. Every walk telescopes from `f(background)` to
//! `f(x)`, so the averaged attributions always sum to
//! `f(x) - mean(f(background))`.

use crate::runtime::Scorer;
use crate::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;

/// Largest permutation sample count accepted per explanation
pub const MAX_SAMPLES: usize = 10_000;

/// Attributions for one explained row
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub values: Vec<f32>,
    /// Mean output over the sampled background rows
    pub expected_value: f32,
    pub prediction: f32,
}

/// Sampling Shapley estimator with a bounded number of permutations
#[derive(Debug, Clone, Copy)]
pub struct SamplingShapley {
    samples: usize,
    output_index: usize,
}

impl SamplingShapley {
    pub fn new(samples: usize, output_index: usize) -> Self {
        Self { samples, output_index }
    }

    /// Explain `x` against `background`, both already in model input space
    pub fn explain<R: Rng + ?Sized>(
        &self,
        scorer: &mut dyn Scorer,
        x: ArrayView1<f32>,
        background: ArrayView2<f32>,
        rng: &mut R,
    ) -> Result<Attribution> {
        let width = x.len();
        if self.samples == 0 || self.samples > MAX_SAMPLES {
            return Err(Error::Attribution(format!(
                "sample count must be in 1..={MAX_SAMPLES}, got {}",
                self.samples
            )));
        }
        if background.nrows() == 0 || background.ncols() != width {
            return Err(Error::Attribution(format!(
                "background must be a non-empty table of width {width}, got {:?}",
                background.dim()
            )));
        }
        if self.output_index >= scorer.output_arity() {
            return Err(Error::Attribution(format!(
                "output {} requested from a model with {} outputs",
                self.output_index,
                scorer.output_arity()
            )));
        }

        // Per sample: background row, then one row per switched feature
        let steps = width + 1;
        let rows = self
            .samples
            .checked_mul(steps)
            .ok_or_else(|| Error::Attribution(format!("{} samples over {width} features is too large", self.samples)))?;
        let mut order: Vec<usize> = (0..width).collect();
        let mut orders = Vec::with_capacity(self.samples);
        let mut walks = Array2::<f32>::zeros((rows, width));
        for s in 0..self.samples {
            let base = background.row(rng.random_range(0..background.nrows()));
            order.shuffle(rng);
            let mut current = base.to_owned();
            walks.row_mut(s * steps).assign(&current);
            for (k, &feature) in order.iter().enumerate() {
                current[feature] = x[feature];
                walks.row_mut(s * steps + k + 1).assign(&current);
            }
            orders.push(order.clone());
        }

        let outputs = scorer.score(&walks)?;
        let column = outputs.column(self.output_index);
        if let Some(bad) = column.iter().position(|v| !v.is_finite()) {
            return Err(Error::Attribution(format!("model produced a non-finite output at row {bad}")));
        }

        let mut values = vec![0.0f64; width];
        let mut expected = 0.0f64;
        for (s, order) in orders.iter().enumerate() {
            let start = s * steps;
            expected += f64::from(column[start]);
            for (k, &feature) in order.iter().enumerate() {
                values[feature] += f64::from(column[start + k + 1]) - f64::from(column[start + k]);
            }
        }

        let n = self.samples as f64;
        let expected_value = (expected / n) as f32;
        let values: Vec<f32> = values.iter().map(|v| (v / n) as f32).collect();
        let prediction = expected_value + values.iter().sum::<f32>();

        Ok(Attribution { values, expected_value, prediction })
    }
}
