//! Seeded train/validation partitioning

use super::Dataset;
use crate::determinism::{DeterministicContext, Stream};
use crate::{Error, Result};
use rand::seq::SliceRandom;

/// Seeded permutation of `0..n` cut at `floor(n * (1 - validation_fraction))`
///
/// Returns `(train, validation)` index lists. Every index lands in exactly
/// one of them.
pub fn split_indices(
    n: usize,
    validation_fraction: f32,
    ctx: &DeterministicContext,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
        return Err(Error::Config(format!(
            "validation fraction must be in (0, 1), got {validation_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut ctx.rng(Stream::Split));

    let cut = (n as f64 * (1.0 - f64::from(validation_fraction))).floor() as usize;
    let validation = indices.split_off(cut);
    Ok((indices, validation))
}

/// Split a dataset into `(train, validation)`
pub fn split(
    dataset: &Dataset,
    validation_fraction: f32,
    ctx: &DeterministicContext,
) -> Result<(Dataset, Dataset)> {
    let (train, validation) = split_indices(dataset.len(), validation_fraction, ctx)?;
    Ok((dataset.select(&train), dataset.select(&validation)))
}
