//! Trainer abstraction for the epoch loop
//!
//! - Single training steps with gradient clipping
//! - Shuffled training epochs and unshuffled validation passes
//! - Plateau learning-rate scheduling and early stopping
//! - Best-checkpoint restoration at the end of a run
//!
//! # Example
//!
//! ```no_run
//! use kerf::determinism::DeterministicContext;
//! use kerf::models::ModelKind;
//! use kerf::optim::Adam;
//! use kerf::train::{TrainConfig, Trainer};
//! # fn run(train: &kerf::data::Dataset, val: &kerf::data::Dataset) -> kerf::Result<()> {
//! let kind = ModelKind::WastePredictor;
//! let config = TrainConfig::default();
//! let mut model = kind.build(&DeterministicContext::new(config.seed))?;
//!
//! let mut trainer = Trainer::new(kind.objective(), Box::new(Adam::default_params(config.lr)), config);
//! let outcome = trainer.train(&mut model, train, val)?;
//! println!("best val loss: {:?}", outcome.best_score);
//! # Ok(())
//! # }
//! ```

mod core;
mod epoch;
mod result;
mod step;
mod train_loop;

pub use core::Trainer;
pub use result::TrainOutcome;
