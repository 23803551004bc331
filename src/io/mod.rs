//! Model artifacts: inference graph, metadata side-car and export

mod export;
mod graph;
mod metadata;

pub use export::{artifact_path, export_model, ExportedModel, ARTIFACT_EXTENSION};
pub use graph::{Dim, ModelGraph, Node, ValueInfo, BATCH_DIM, GRAPH_FORMAT, GRAPH_OPSET};
pub use metadata::{metadata_path, ModelMetadata, METADATA_VERSION};
