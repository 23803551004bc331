//! The four production model variants

use super::{Activation, FeedForwardNet, LayerSpec};
use crate::data::{field_value, synthetic, Dataset, Labels, Record, MIN_REAL_RECORDS};
use crate::determinism::{DeterministicContext, Stream};
use crate::train::{CrossEntropyLoss, MSELoss, Objective};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const WASTE_FEATURES: [&str; 19] = [
    "totalPieceCount",
    "uniquePieceCount",
    "avgPieceArea",
    "pieceAreaStdDev",
    "minPieceArea",
    "maxPieceArea",
    "pieceAspectRatioMean",
    "pieceAspectRatioStdDev",
    "totalStockArea",
    "stockSheetCount",
    "avgStockArea",
    "stockAspectRatio",
    "totalDemandToStockRatio",
    "pieceToStockSizeRatio",
    "kerf",
    "allowRotation",
    "materialTypeIndex",
    "historicalAvgWaste",
    "lastJobWaste",
];

const TIME_FEATURES: [&str; 12] = [
    "totalPieces",
    "totalCuts",
    "wastePercentage",
    "stockUsedCount",
    "machineType",
    "machineSpeed",
    "materialTypeIndex",
    "thickness",
    "averagePieceArea",
    "maxPieceArea",
    "operatorAvgTime",
    "machineAvgTime",
];

const ALGORITHM_FEATURES: [&str; 14] = [
    "pieceSizeVariance",
    "smallPieceRatio",
    "largePieceRatio",
    "squarePieceRatio",
    "uniqueShapeCount",
    "rotationAllowed",
    "grainConstraintRatio",
    "stockVariety",
    "standardSizeRatio",
    "bottomLeftHistoricalWaste",
    "guillotineHistoricalWaste",
    "maxrectsHistoricalWaste",
    "totalPieceCount",
    "totalStockCount",
];

const ANOMALY_FEATURES: [&str; 12] = [
    "currentWaste",
    "currentTime",
    "currentEfficiency",
    "wasteDeviation",
    "timeDeviation",
    "efficiencyDeviation",
    "recentAnomalyCount",
    "avgHistoricalWaste",
    "avgHistoricalTime",
    "dayOfWeek",
    "hourOfDay",
    "isWeekend",
];

/// Class names of the algorithm selector, in logit order
pub const ALGORITHMS: [&str; 3] = ["BOTTOM_LEFT", "GUILLOTINE", "MAXRECTS"];

/// Anomaly type names, in the order of outputs 1..=4 of the anomaly predictor
pub const ANOMALY_TYPES: [&str; 4] = ["high_waste", "slow_production", "machine_issue", "quality_problem"];

/// Kind of supervision a model is trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Regression,
    Classification { classes: usize },
}

/// Where a training table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Real,
    Synthetic,
}

/// Registered model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    WastePredictor,
    TimeEstimator,
    AlgorithmSelector,
    AnomalyPredictor,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::WastePredictor,
        ModelKind::TimeEstimator,
        ModelKind::AlgorithmSelector,
        ModelKind::AnomalyPredictor,
    ];

    /// Wire name, e.g. `waste_predictor`
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::WastePredictor => "waste_predictor",
            ModelKind::TimeEstimator => "time_estimator",
            ModelKind::AlgorithmSelector => "algorithm_selector",
            ModelKind::AnomalyPredictor => "anomaly_predictor",
        }
    }

    /// Declared input layout
    pub fn feature_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::WastePredictor => &WASTE_FEATURES,
            ModelKind::TimeEstimator => &TIME_FEATURES,
            ModelKind::AlgorithmSelector => &ALGORITHM_FEATURES,
            ModelKind::AnomalyPredictor => &ANOMALY_FEATURES,
        }
    }

    pub fn input_arity(self) -> usize {
        self.feature_names().len()
    }

    pub fn output_arity(self) -> usize {
        match self {
            ModelKind::WastePredictor | ModelKind::TimeEstimator => 1,
            ModelKind::AlgorithmSelector => ALGORITHMS.len(),
            ModelKind::AnomalyPredictor => 1 + ANOMALY_TYPES.len(),
        }
    }

    pub fn task(self) -> TaskKind {
        match self {
            ModelKind::AlgorithmSelector => TaskKind::Classification { classes: ALGORITHMS.len() },
            _ => TaskKind::Regression,
        }
    }

    /// Layer stack of the variant
    pub fn architecture(self) -> Vec<LayerSpec> {
        use Activation::{LeakyRelu, Relu, Sigmoid};
        use LayerSpec::{Activation as Act, BatchNorm, Branches, Dropout, Linear};

        match self {
            ModelKind::WastePredictor => vec![
                Linear(128),
                Act(LeakyRelu(0.1)),
                BatchNorm,
                Dropout(0.3),
                Linear(64),
                Act(LeakyRelu(0.1)),
                BatchNorm,
                Dropout(0.2),
                Linear(32),
                Act(LeakyRelu(0.1)),
                BatchNorm,
                Linear(16),
                Act(Relu),
                Linear(1),
                Act(Sigmoid),
            ],
            ModelKind::TimeEstimator => vec![
                Linear(64),
                Act(LeakyRelu(0.1)),
                BatchNorm,
                Dropout(0.2),
                Linear(32),
                Act(LeakyRelu(0.1)),
                BatchNorm,
                Linear(16),
                Act(Relu),
                Linear(1),
                Act(Relu),
            ],
            ModelKind::AlgorithmSelector => vec![
                Linear(64),
                Act(Relu),
                BatchNorm,
                Dropout(0.3),
                Linear(32),
                Act(Relu),
                BatchNorm,
                Dropout(0.2),
                Linear(16),
                Act(Relu),
                Linear(ALGORITHMS.len()),
            ],
            ModelKind::AnomalyPredictor => vec![
                Linear(64),
                Act(Relu),
                BatchNorm,
                Dropout(0.2),
                Linear(32),
                Act(Relu),
                BatchNorm,
                Branches(vec![
                    vec![Linear(16), Act(Relu), Linear(1), Act(Sigmoid)],
                    vec![Linear(16), Act(Relu), Linear(ANOMALY_TYPES.len()), Act(Sigmoid)],
                ]),
            ],
        }
    }

    /// Fresh network initialized from the context's init stream
    pub fn build(self, ctx: &DeterministicContext) -> Result<FeedForwardNet> {
        FeedForwardNet::new(self.input_arity(), &self.architecture(), ctx)
    }

    /// Loss matching the variant's task kind
    pub fn objective(self) -> Objective {
        match self.task() {
            TaskKind::Regression => Objective::Regression(Box::new(MSELoss)),
            TaskKind::Classification { .. } => Objective::Classification(Box::new(CrossEntropyLoss)),
        }
    }

    /// Feature table and labels from raw records; missing fields read as 0
    pub fn extract(self, records: &[Record]) -> Dataset {
        let names = self.feature_names();
        let features = Array2::from_shape_fn((records.len(), names.len()), |(r, c)| {
            field_value(&records[r], names[c])
        });

        let labels = match self {
            ModelKind::WastePredictor => continuous(records, 1, |r, out| {
                out[0] = field_value(r, "actualWastePercent") / 100.0;
            }),
            ModelKind::TimeEstimator => continuous(records, 1, |r, out| {
                out[0] = (field_value(r, "actualTimeMinutes") / 180.0).min(1.0);
            }),
            ModelKind::AlgorithmSelector => Labels::Classes(
                records
                    .iter()
                    .map(|r| {
                        r.get("bestAlgorithm")
                            .and_then(|v| v.as_str())
                            .and_then(|name| ALGORITHMS.iter().position(|a| *a == name))
                            .unwrap_or(0)
                    })
                    .collect(),
            ),
            ModelKind::AnomalyPredictor => continuous(records, 1 + ANOMALY_TYPES.len(), |r, out| {
                if field_value(r, "hadAnomaly") != 0.0 {
                    out[0] = 0.8;
                    // quality_problem is never reported by the production records
                    let kind = r.get("anomalyType").and_then(|v| v.as_str());
                    if let Some(i) = kind.and_then(|k| ANOMALY_TYPES[..3].iter().position(|t| *t == k)) {
                        out[1 + i] = 1.0;
                    }
                } else {
                    out[0] = 0.1;
                }
            }),
        };

        Dataset { features, labels }
    }

    /// Synthetic table of `n` rows from the variant's generator
    pub fn synthetic(self, n: usize, ctx: &DeterministicContext) -> Dataset {
        let mut rng = ctx.rng(Stream::Synthetic);
        match self {
            ModelKind::WastePredictor => synthetic::waste(n, &mut rng),
            ModelKind::TimeEstimator => synthetic::time(n, &mut rng),
            ModelKind::AlgorithmSelector => synthetic::algorithm(n, &mut rng),
            ModelKind::AnomalyPredictor => synthetic::anomaly(n, &mut rng),
        }
    }

    /// Real table when enough records exist, synthetic otherwise
    pub fn prepare_dataset(self, records: &[Record], ctx: &DeterministicContext) -> (Dataset, DataSource) {
        if records.len() >= MIN_REAL_RECORDS {
            tracing::info!(model = self.name(), records = records.len(), "using real training records");
            (self.extract(records), DataSource::Real)
        } else {
            tracing::warn!(
                model = self.name(),
                records = records.len(),
                minimum = MIN_REAL_RECORDS,
                "insufficient real data, generating synthetic table"
            );
            (self.synthetic(synthetic::SYNTHETIC_ROWS, ctx), DataSource::Synthetic)
        }
    }
}

fn continuous(records: &[Record], width: usize, fill: impl Fn(&Record, &mut [f32])) -> Labels {
    let mut y = Array2::<f32>::zeros((records.len(), width));
    for (record, mut row) in records.iter().zip(y.rows_mut()) {
        let mut values = vec![0.0; width];
        fill(record, &mut values);
        row.assign(&ndarray::ArrayView1::from(&values[..]));
    }
    Labels::Continuous(y)
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|k| k.name() == s).ok_or_else(|| {
            let known: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
            Error::Config(format!("unknown model type '{s}' (expected one of {})", known.join(", ")))
        })
    }
}
