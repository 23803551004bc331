//! Training callbacks
//!
//! Callbacks observe the epoch loop and may ask it to stop. Early stopping
//! and learning-rate scheduling are owned by the trainer itself, so callbacks
//! never decide which checkpoint is kept.

mod manager;
mod progress;
mod traits;

pub use manager::CallbackManager;
pub use progress::ProgressCallback;
pub use traits::{CallbackAction, CallbackContext, TrainerCallback};
