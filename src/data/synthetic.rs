//! Synthetic training tables mimicking real cutting jobs
//!
//! Used when fewer than [`super::MIN_REAL_RECORDS`] real records exist. Each
//! generator draws correlated features and derives labels from the same
//! domain rules the production models are expected to learn.

use super::{Dataset, Labels};
use ndarray::{Array2, Axis};
use rand::Rng;
use rand_distr::StandardNormal;

/// Rows generated when substituting synthetic data
pub const SYNTHETIC_ROWS: usize = 2000;

fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    rng.random_range(low..high)
}

/// Integer in `[low, high)` as `f32`
fn integer<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> f32 {
    rng.random_range(low..high) as f32
}

/// 19 job features, label = waste fraction in `[0.02, 0.50]`
pub fn waste<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Dataset {
    let mut x = Array2::<f32>::zeros((n, 19));
    let mut y = Array2::<f32>::zeros((n, 1));

    for (mut row, mut label) in x.axis_iter_mut(Axis(0)).zip(y.axis_iter_mut(Axis(0))) {
        row[0] = integer(rng, 10, 500);
        row[1] = (row[0] * uniform(rng, 0.1, 0.5)).clamp(1.0, 100.0);
        row[2] = uniform(rng, 1000.0, 50000.0);
        row[3] = row[2] * uniform(rng, 0.1, 0.5);
        row[4] = row[2] * uniform(rng, 0.2, 0.8);
        row[5] = row[2] * uniform(rng, 1.2, 3.0);
        row[6] = uniform(rng, 1.0, 4.0);
        row[7] = uniform(rng, 0.1, 1.0);
        row[8] = uniform(rng, 1e6, 1e8);
        row[9] = integer(rng, 1, 50);
        row[10] = row[8] / row[9];
        row[11] = uniform(rng, 1.5, 2.5);
        row[12] = uniform(rng, 0.3, 0.95);
        row[13] = uniform(rng, 0.01, 0.3);
        row[14] = uniform(rng, 1.0, 5.0);
        row[15] = integer(rng, 0, 2);
        row[16] = integer(rng, 0, 10);
        row[17] = uniform(rng, 5.0, 25.0);
        row[18] = row[17] * uniform(rng, 0.8, 1.2);

        let noise: f32 = rng.sample::<f32, _>(StandardNormal) * 0.02;
        let waste = 0.10 - 0.15 * (row[12] - 0.5)
            + 0.05 * (row[1] / row[0])
            + 0.03 * row[7]
            + 0.01 * row[14]
            - 0.02 * row[15]
            + 0.3 * (row[17] / 100.0)
            + noise;
        label[0] = waste.clamp(0.02, 0.50);
    }

    Dataset { features: x, labels: Labels::Continuous(y) }
}

/// 12 job/machine features, label = minutes / 180 clipped to `[0, 1]`
pub fn time<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Dataset {
    let mut x = Array2::<f32>::zeros((n, 12));
    let mut y = Array2::<f32>::zeros((n, 1));

    for (mut row, mut label) in x.axis_iter_mut(Axis(0)).zip(y.axis_iter_mut(Axis(0))) {
        row[0] = integer(rng, 10, 500);
        row[1] = row[0] * uniform(rng, 2.0, 6.0);
        row[2] = uniform(rng, 5.0, 30.0);
        row[3] = integer(rng, 1, 30);
        row[4] = integer(rng, 0, 3);
        row[5] = uniform(rng, 0.5, 2.0);
        row[6] = integer(rng, 0, 10);
        row[7] = uniform(rng, 1.0, 25.0);
        row[8] = uniform(rng, 5000.0, 100000.0);
        row[9] = row[8] * uniform(rng, 1.5, 4.0);
        row[10] = uniform(rng, 30.0, 120.0);
        row[11] = uniform(rng, 20.0, 90.0);

        let base = row[0] * 0.5 + row[1] * 0.05 + row[3] * 2.0;
        let machine = 1.0 - row[4] * 0.15;
        let thickness = 1.0 + row[7] / 50.0;
        let minutes = base * machine * thickness / row[5];
        label[0] = (minutes / 180.0).clamp(0.0, 1.0);
    }

    Dataset { features: x, labels: Labels::Continuous(y) }
}

/// 14 piece/stock features, label = best algorithm class
pub fn algorithm<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Dataset {
    let mut x = Array2::<f32>::zeros((n, 14));
    let mut classes = Vec::with_capacity(n);

    for mut row in x.axis_iter_mut(Axis(0)) {
        for col in 0..4 {
            row[col] = uniform(rng, 0.0, 1.0);
        }
        row[4] = integer(rng, 1, 50);
        row[5] = integer(rng, 0, 2);
        row[6] = uniform(rng, 0.0, 1.0);
        row[7] = integer(rng, 1, 10);
        row[8] = uniform(rng, 0.0, 1.0);
        for col in 9..12 {
            row[col] = uniform(rng, 8.0, 25.0);
        }
        row[12] = integer(rng, 10, 500);
        row[13] = integer(rng, 1, 30);

        let class = if row[0] > 0.7 {
            2
        } else if row[6] > 0.5 {
            1
        } else if row[1] > 0.6 {
            0
        } else {
            // Lowest historical waste wins; first on ties
            (9..12)
                .map(|col| row[col])
                .enumerate()
                .fold((0, f32::INFINITY), |best, (i, w)| if w < best.1 { (i, w) } else { best })
                .0
        };
        classes.push(class);
    }

    Dataset { features: x, labels: Labels::Classes(classes) }
}

/// 12 production-state features, label = `[risk, high_waste, slow_production,
/// machine_issue, quality_problem]`
pub fn anomaly<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Dataset {
    let mut x = Array2::<f32>::zeros((n, 12));
    let mut y = Array2::<f32>::zeros((n, 5));

    for (mut row, mut label) in x.axis_iter_mut(Axis(0)).zip(y.axis_iter_mut(Axis(0))) {
        row[0] = uniform(rng, 5.0, 35.0);
        row[1] = uniform(rng, 20.0, 120.0);
        row[2] = uniform(rng, 0.5, 1.0);
        row[3] = uniform(rng, -2.0, 3.0);
        row[4] = uniform(rng, -1.0, 2.0);
        row[5] = uniform(rng, -1.5, 1.0);
        row[6] = integer(rng, 0, 5);
        row[7] = uniform(rng, 10.0, 20.0);
        row[8] = uniform(rng, 40.0, 80.0);
        row[9] = integer(rng, 0, 7);
        row[10] = integer(rng, 6, 22);
        row[11] = if row[9] >= 5.0 { 1.0 } else { 0.0 };

        let mut risk: f32 = 0.0;
        if row[3] > 1.5 {
            label[1] = (row[3] / 3.0).min(0.9);
            risk += 0.3;
        }
        if row[4] > 1.0 {
            label[2] = (row[4] / 2.0).min(0.9);
            risk += 0.25;
        }
        if row[5] < -1.0 {
            label[3] = (row[5].abs() / 2.0).min(0.9);
            risk += 0.25;
        }
        if row[6] >= 3.0 {
            risk += 0.15;
            label[4] = 0.3;
        }
        if row[11] == 1.0 || row[10] > 20.0 || row[10] < 7.0 {
            risk += 0.05;
        }
        label[0] = risk.min(1.0);
    }

    Dataset { features: x, labels: Labels::Continuous(y) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_waste_labels_clipped() {
        let ds = waste(500, &mut StdRng::seed_from_u64(42));
        let Labels::Continuous(y) = &ds.labels else { panic!("continuous labels expected") };
        assert!(y.iter().all(|&v| (0.02..=0.50).contains(&v)));
        assert_eq!(ds.n_features(), 19);
    }

    #[test]
    fn test_time_labels_in_unit_interval() {
        let ds = time(300, &mut StdRng::seed_from_u64(1));
        let Labels::Continuous(y) = &ds.labels else { panic!("continuous labels expected") };
        assert!(y.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_algorithm_rules() {
        let ds = algorithm(400, &mut StdRng::seed_from_u64(3));
        let Labels::Classes(classes) = &ds.labels else { panic!("class labels expected") };
        for (row, &class) in ds.features.axis_iter(Axis(0)).zip(classes) {
            assert!(class < 3);
            if row[0] > 0.7 {
                assert_eq!(class, 2);
            } else if row[6] > 0.5 {
                assert_eq!(class, 1);
            }
        }
    }

    #[test]
    fn test_anomaly_weekend_flag_matches_day() {
        let ds = anomaly(200, &mut StdRng::seed_from_u64(5));
        for row in ds.features.axis_iter(Axis(0)) {
            assert_eq!(row[11] == 1.0, row[9] >= 5.0);
        }
        let Labels::Continuous(y) = &ds.labels else { panic!("continuous labels expected") };
        assert_eq!(y.ncols(), 5);
        assert!(y.column(0).iter().all(|&r| (0.0..=1.0).contains(&r)));
    }

    #[test]
    fn test_same_seed_same_table() {
        let a = waste(50, &mut StdRng::seed_from_u64(9));
        let b = waste(50, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
