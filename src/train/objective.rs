//! Task-kind loss dispatch
//!
//! The caller states whether targets are continuous or class indices; the
//! trainer never infers it from label shape.

use super::loss::{ClassificationLossFn, LossFn};
use crate::data::Labels;
use crate::{Error, Result, Tensor};
use ndarray::Array1;

/// Loss paired with the label kind it accepts
pub enum Objective {
    Regression(Box<dyn LossFn>),
    Classification(Box<dyn ClassificationLossFn>),
}

impl Objective {
    /// Loss of row-major `rows x cols` predictions against `labels`
    pub fn loss(&self, predictions: &Tensor, labels: &Labels, rows: usize, cols: usize) -> Result<Tensor> {
        if labels.len() != rows {
            return Err(Error::Training(format!("{rows} prediction rows but {} labels", labels.len())));
        }
        match (self, labels) {
            (Objective::Regression(loss), Labels::Continuous(targets)) => {
                if targets.ncols() != cols {
                    return Err(Error::Config(format!(
                        "model emits {cols} outputs but targets have {} columns",
                        targets.ncols()
                    )));
                }
                let targets = Tensor::new(Array1::from_iter(targets.iter().copied()), false);
                Ok(loss.forward(predictions, &targets))
            }
            (Objective::Classification(loss), Labels::Classes(classes)) => {
                if let Some(&bad) = classes.iter().find(|&&c| c >= cols) {
                    return Err(Error::Config(format!("class index {bad} but model emits {cols} logits")));
                }
                Ok(loss.forward(predictions, classes, cols))
            }
            (Objective::Regression(_), Labels::Classes(_)) => {
                Err(Error::Config("regression objective given class labels".into()))
            }
            (Objective::Classification(_), Labels::Continuous(_)) => {
                Err(Error::Config("classification objective given continuous labels".into()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Objective::Regression(loss) => loss.name(),
            Objective::Classification(loss) => loss.name(),
        }
    }
}
