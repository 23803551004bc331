//! Tabular training data: records, tables, normalization and splitting

mod loader;
mod normalize;
mod split;
pub mod synthetic;

pub use loader::{field_value, load_records, Record, MIN_REAL_RECORDS};
pub use normalize::{fit_transform, NormalizationParams, MIN_STD};
pub use split::{split, split_indices};

use crate::{Error, Result};
use ndarray::{Array2, Axis};

/// Training targets, one entry per row
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// Continuous targets, `rows x outputs`
    Continuous(Array2<f32>),
    /// Class indices
    Classes(Vec<usize>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Continuous(t) => t.nrows(),
            Labels::Classes(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Labels {
        match self {
            Labels::Continuous(t) => Labels::Continuous(t.select(Axis(0), indices)),
            Labels::Classes(c) => Labels::Classes(indices.iter().map(|&i| c[i]).collect()),
        }
    }
}

/// Feature table with aligned labels
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub features: Array2<f32>,
    pub labels: Labels,
}

impl Dataset {
    pub fn new(features: Array2<f32>, labels: Labels) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::Data(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(indices),
        }
    }
}
