//! Z-score normalization

use crate::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard deviations at or below this are replaced by `1.0`
pub const MIN_STD: f32 = 1e-6;

/// Per-feature `(x - mean) / std` parameters
///
/// Serialized as `{"means": [...], "stds": [...]}` in the metadata side-car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub means: Vec<f32>,
    pub stds: Vec<f32>,
}

impl NormalizationParams {
    /// Compute column means and population standard deviations
    pub fn fit(table: &Array2<f32>) -> Result<Self> {
        if table.nrows() == 0 {
            return Err(Error::Data("cannot fit normalization on an empty table".into()));
        }
        let wide = table.mapv(f64::from);
        let means = wide.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(table.ncols()));
        let stds = wide.std_axis(Axis(0), 0.0);

        Ok(Self {
            means: means.iter().map(|&m| m as f32).collect(),
            stds: stds
                .iter()
                .map(|&s| if s as f32 > MIN_STD { s as f32 } else { 1.0 })
                .collect(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Normalize a table with these parameters; never refits
    pub fn apply(&self, table: &Array2<f32>) -> Result<Array2<f32>> {
        if table.ncols() != self.n_features() || self.stds.len() != self.n_features() {
            return Err(Error::Artifact(format!(
                "normalization expects {} features, table has {}",
                self.n_features(),
                table.ncols()
            )));
        }
        let means = Array1::from(self.means.clone());
        let stds = Array1::from(self.stds.clone());
        Ok((table - &means) / &stds)
    }
}

/// Fit parameters on `table` and return it normalized
pub fn fit_transform(table: &Array2<f32>) -> Result<(Array2<f32>, NormalizationParams)> {
    let params = NormalizationParams::fit(table)?;
    let normalized = params.apply(table)?;
    Ok((normalized, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_fit_transform_zero_mean_unit_std() {
        let table = array![[1.0, 10.0], [3.0, 20.0], [5.0, 30.0]];
        let (norm, params) = fit_transform(&table).expect("fit should succeed");

        assert_abs_diff_eq!(params.means[0], 3.0);
        // Population std of [1, 3, 5]
        assert_abs_diff_eq!(params.stds[0], (8.0f32 / 3.0).sqrt(), epsilon = 1e-6);
        assert_abs_diff_eq!(norm.column(1).sum(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_apply_reuses_fitted_stats() {
        let params = NormalizationParams { means: vec![2.0], stds: vec![4.0] };
        let out = params.apply(&array![[10.0]]).expect("apply should succeed");
        assert_abs_diff_eq!(out[[0, 0]], 2.0);
    }

    #[test]
    fn test_apply_rejects_width_mismatch() {
        let params = NormalizationParams { means: vec![0.0], stds: vec![1.0] };
        assert!(params.apply(&array![[1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_empty_table_is_data_error() {
        let empty = Array2::<f32>::zeros((0, 3));
        assert!(matches!(fit_transform(&empty), Err(Error::Data(_))));
    }

    #[test]
    fn test_params_wire_shape() {
        let params = NormalizationParams { means: vec![1.0], stds: vec![2.0] };
        let json = serde_json::to_value(&params).expect("serialize");
        assert_eq!(json, serde_json::json!({"means": [1.0], "stds": [2.0]}));
    }

    proptest! {
        #[test]
        fn prop_constant_column_gets_unit_std(
            value in -1e4f32..1e4,
            rows in 1usize..50,
            other in prop::collection::vec(-100.0f32..100.0, 50),
        ) {
            let mut table = Array2::<f32>::zeros((rows, 2));
            for r in 0..rows {
                table[[r, 0]] = value;
                table[[r, 1]] = other[r];
            }
            let (norm, params) = fit_transform(&table).expect("fit should succeed");
            prop_assert_eq!(params.stds[0], 1.0);
            for v in norm.column(0) {
                prop_assert!(v.is_finite());
                prop_assert!(v.abs() < 1e-2);
            }
        }
    }
}
