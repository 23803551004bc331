//! Scoring runtimes for exported artifacts
//!
//! [`GraphSession`] evaluates `kerf-graph` artifacts natively. With the
//! `onnx` feature, `.onnx` files are scored through ONNX Runtime.

mod session;

#[cfg(feature = "onnx")]
mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::OnnxSession;
pub use session::GraphSession;

use crate::{Error, Result};
use ndarray::Array2;
use std::path::Path;

/// A compiled model that scores tables of feature rows
pub trait Scorer {
    fn input_arity(&self) -> usize;

    fn output_arity(&self) -> usize;

    /// Score `rows x input_arity` features into `rows x output_arity` outputs
    fn score(&mut self, rows: &Array2<f32>) -> Result<Array2<f32>>;
}

/// Open the artifact at `path`, choosing the runtime by extension
///
/// `input_arity` comes from the metadata side-car and is checked against
/// the artifact where the format declares it.
pub fn open_scorer(path: &Path, input_arity: usize) -> Result<Box<dyn Scorer>> {
    if !path.exists() {
        return Err(Error::CapabilityUnavailable(format!("no model artifact at {}", path.display())));
    }
    let is_onnx = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        open_onnx(path, input_arity)
    } else {
        let session = GraphSession::load(path)?;
        if session.input_arity() != input_arity {
            return Err(Error::Artifact(format!(
                "artifact takes {} inputs but the side-car declares {input_arity}",
                session.input_arity()
            )));
        }
        Ok(Box::new(session))
    }
}

#[cfg(feature = "onnx")]
fn open_onnx(path: &Path, input_arity: usize) -> Result<Box<dyn Scorer>> {
    Ok(Box::new(OnnxSession::load(path, input_arity)?))
}

#[cfg(not(feature = "onnx"))]
fn open_onnx(path: &Path, _input_arity: usize) -> Result<Box<dyn Scorer>> {
    Err(Error::CapabilityUnavailable(format!(
        "{} needs ONNX Runtime; rebuild with the `onnx` feature",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let err = open_scorer(Path::new("/nonexistent/model.kerf"), 3).err();
        assert!(matches!(err, Some(Error::CapabilityUnavailable(_))));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_without_feature_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("m.onnx");
        std::fs::write(&path, b"not really onnx").expect("write");
        assert!(matches!(open_scorer(&path, 3).err(), Some(Error::CapabilityUnavailable(_))));
    }
}
