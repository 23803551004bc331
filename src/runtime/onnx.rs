//! ONNX Runtime scoring for externally produced `.onnx` artifacts

use super::Scorer;
use crate::{Error, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;

pub struct OnnxSession {
    session: Session,
    output_name: String,
    input_arity: usize,
    output_arity: usize,
}

impl OnnxSession {
    pub fn load(path: &Path, input_arity: usize) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| Error::CapabilityUnavailable(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::CapabilityUnavailable(format!("optimization level: {e}")))?
            .commit_from_file(path)
            .map_err(|e| Error::CapabilityUnavailable(format!("load {}: {e}", path.display())))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::Artifact(format!("{} declares no outputs", path.display())))?;

        let mut scorer = Self { session, output_name, input_arity, output_arity: 0 };
        // Probe once to learn the output width
        let probe = scorer.run(&Array2::zeros((1, input_arity)))?;
        scorer.output_arity = probe.ncols();
        tracing::info!(path = %path.display(), input_arity, output_arity = scorer.output_arity, "ONNX model loaded");
        Ok(scorer)
    }

    fn run(&mut self, rows: &Array2<f32>) -> Result<Array2<f32>> {
        let n = rows.nrows();
        let input = Value::from_array(rows.clone()).map_err(|e| Error::Artifact(format!("tensor: {e}")))?;
        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| Error::Attribution(format!("inference failed: {e}")))?;
        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| Error::Artifact(format!("missing output '{}'", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Artifact(format!("extract output: {e}")))?;

        let width = if n == 0 { 0 } else { data.len() / n };
        Array2::from_shape_vec((n, width), data.to_vec())
            .map_err(|e| Error::Artifact(format!("output shape: {e}")))
    }
}

impl Scorer for OnnxSession {
    fn input_arity(&self) -> usize {
        self.input_arity
    }

    fn output_arity(&self) -> usize {
        self.output_arity
    }

    fn score(&mut self, rows: &Array2<f32>) -> Result<Array2<f32>> {
        if rows.ncols() != self.input_arity {
            return Err(Error::Input(format!(
                "model takes {} features per row, got {}",
                self.input_arity,
                rows.ncols()
            )));
        }
        self.run(rows)
    }
}
