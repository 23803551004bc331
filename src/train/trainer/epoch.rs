//! Epoch-level training and validation passes

use super::core::Trainer;
use crate::data::Dataset;
use crate::determinism::Stream;
use crate::models::TabularModel;
use crate::train::BatchLoader;
use crate::{Error, Result};

impl Trainer {
    /// One shuffled pass over `train`; returns the mean batch loss
    ///
    /// The batch order depends only on the run seed and `epoch`.
    pub fn train_epoch(&mut self, model: &mut dyn TabularModel, train: &Dataset, epoch: usize) -> Result<f32> {
        model.set_training(true);
        let mut rng = self.ctx.rng(Stream::Epoch(epoch));

        let loader = BatchLoader::shuffled(train, self.config.batch_size, &mut rng);
        let batches = loader.num_batches();
        if batches == 0 {
            return Err(Error::Training("training split is empty".into()));
        }
        let mut total = 0.0;
        for batch in loader {
            total += self.train_step(model, &batch)?;
        }
        Ok(total / batches as f32)
    }

    /// One pass over `val` in inference mode; returns the mean batch loss
    pub fn validate(&self, model: &mut dyn TabularModel, val: &Dataset) -> Result<f32> {
        model.set_training(false);

        let loader = BatchLoader::sequential(val, self.config.batch_size);
        let batches = loader.num_batches();
        if batches == 0 {
            return Err(Error::Training("validation split is empty".into()));
        }
        let mut total = 0.0;
        for batch in loader {
            total += self.eval_step(model, &batch)?;
        }
        Ok(total / batches as f32)
    }
}
