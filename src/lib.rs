//! Kerf: training and explanations for cutting-optimization models
//!
//! Kerf trains small tabular networks that predict cutting waste, estimate
//! production time, pick a nesting algorithm and score anomaly risk. It
//! exports each network as a portable inference graph with a metadata
//! side-car and explains single predictions with sampling Shapley
//! attribution, falling back to a per-model heuristic when the artifact
//! cannot be scored.
//!
//! # Modules
//!
//! - [`autograd`]: tape-based reverse-mode differentiation
//! - [`optim`]: Adam, SGD, gradient clipping and plateau scheduling
//! - [`data`]: record loading, normalization and seeded splitting
//! - [`models`]: the [`models::TabularModel`] interface and registered model types
//! - [`train`]: epoch loop, early stopping and losses
//! - [`io`]: artifact export and the metadata side-car
//! - [`runtime`]: scoring exported artifacts
//! - [`explain`]: the explanation engine

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod determinism;
pub mod error;
pub mod explain;
pub mod io;
pub mod models;
pub mod optim;
pub mod runtime;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
