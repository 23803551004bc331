//! Tabular network capability interface and its implementations

mod feedforward;
mod kinds;

pub use feedforward::{Activation, FeedForwardNet, LayerSpec};
pub use kinds::{DataSource, ModelKind, TaskKind, ALGORITHMS, ANOMALY_TYPES};

use crate::autograd::Tensor;
use crate::io::ModelGraph;
use crate::Result;
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Deep copy of every parameter and running statistic, keyed by name
pub type StateDict = BTreeMap<String, Array1<f32>>;

/// A fixed-arity differentiable function of one feature row per batch entry
///
/// The training orchestrator and exporter depend only on this trait.
pub trait TabularModel {
    /// Features per input row
    fn input_arity(&self) -> usize;

    /// Values per output row
    fn output_arity(&self) -> usize;

    /// Number of trainable scalars
    fn parameter_count(&self) -> usize;

    /// Run `batch` rows (`input` is row-major `batch x input_arity`)
    ///
    /// Output is row-major `batch x output_arity`. In training mode this may
    /// update running statistics and draw dropout masks.
    fn forward(&mut self, input: &Tensor, batch: usize) -> Tensor;

    /// Trainable parameters, always in the same order
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Switch between training and inference behaviour
    fn set_training(&mut self, training: bool);

    fn is_training(&self) -> bool;

    /// Independent snapshot of the full model state
    fn state_dict(&self) -> StateDict;

    /// Restore a snapshot taken from a model with the same architecture
    fn load_state_dict(&mut self, state: &StateDict) -> Result<()>;

    /// Inference-mode graph for export
    fn to_graph(&self) -> ModelGraph;

    /// Score a table in the current mode
    fn predict(&mut self, input: &Array2<f32>) -> Array2<f32> {
        let rows = input.nrows();
        let flat = Tensor::new(Array1::from_iter(input.iter().copied()), false);
        let out = self.forward(&flat, rows);
        let cols = self.output_arity();
        Array2::from_shape_fn((rows, cols), |(r, c)| out.data()[r * cols + c])
    }
}
