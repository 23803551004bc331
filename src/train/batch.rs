//! Mini-batches over a dataset

use crate::data::{Dataset, Labels};
use crate::Tensor;
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;

/// A training batch: flat row-major inputs and the matching labels
#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: Tensor,
    pub labels: Labels,
    pub rows: usize,
}

impl Batch {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            inputs: Tensor::new(Array1::from_iter(dataset.features.iter().copied()), false),
            labels: dataset.labels.clone(),
            rows: dataset.len(),
        }
    }
}

/// Fixed-size batches in a fixed row order; the last partial batch is kept
pub struct BatchLoader<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    order: Vec<usize>,
    cursor: usize,
}

impl<'a> BatchLoader<'a> {
    /// Rows in dataset order
    pub fn sequential(dataset: &'a Dataset, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        Self { dataset, batch_size, order: (0..dataset.len()).collect(), cursor: 0 }
    }

    /// Rows in an order drawn from `rng`
    pub fn shuffled<R: Rng + ?Sized>(dataset: &'a Dataset, batch_size: usize, rng: &mut R) -> Self {
        let mut loader = Self::sequential(dataset, batch_size);
        loader.order.shuffle(rng);
        loader
    }

    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batch_size)
    }
}

impl Iterator for BatchLoader<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let rows = &self.order[self.cursor..end];
        self.cursor = end;
        Some(Batch::from_dataset(&self.dataset.select(rows)))
    }
}
