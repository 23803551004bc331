//! Portable inference graph
//!
//! A trained network serialized as a flat list of inference-mode operators.
//! The input and output value infos carry a symbolic leading `batch_size`
//! dimension so one artifact scores any number of rows.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Artifact format tag
pub const GRAPH_FORMAT: &str = "kerf-graph";

/// Operator set version written by this crate and the only one it loads
pub const GRAPH_OPSET: u32 = 1;

/// Symbolic batch dimension name
pub const BATCH_DIM: &str = "batch_size";

/// One tensor dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Fixed(usize),
    Symbolic(String),
}

/// Named graph input or output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub name: String,
    pub shape: Vec<Dim>,
}

impl ValueInfo {
    /// `[batch_size, width]`
    pub fn batched(name: &str, width: usize) -> Self {
        Self { name: name.to_string(), shape: vec![Dim::Symbolic(BATCH_DIM.to_string()), Dim::Fixed(width)] }
    }

    /// Fixed trailing width, if the shape is `[batch, width]`
    pub fn width(&self) -> Option<usize> {
        match self.shape.as_slice() {
            [_, Dim::Fixed(w)] => Some(*w),
            _ => None,
        }
    }
}

/// Inference-mode operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum Node {
    /// `y = x W + b`, `W` row-major `inputs x outputs`
    Gemm { inputs: usize, outputs: usize, weight: Vec<f32>, bias: Vec<f32> },
    Relu,
    LeakyRelu { alpha: f32 },
    Sigmoid,
    /// Per-column `scale * (x - mean) / sqrt(var + epsilon) + bias`
    BatchNormalization { scale: Vec<f32>, bias: Vec<f32>, mean: Vec<f32>, var: Vec<f32>, epsilon: f32 },
    /// Run every branch on the same input and concatenate columns
    Concat { branches: Vec<Vec<Node>> },
}

/// Serialized computation graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGraph {
    pub format: String,
    pub opset: u32,
    pub producer: String,
    pub input: ValueInfo,
    pub output: ValueInfo,
    pub nodes: Vec<Node>,
}

impl ModelGraph {
    pub fn new(input_arity: usize, output_arity: usize, nodes: Vec<Node>) -> Self {
        Self {
            format: GRAPH_FORMAT.to_string(),
            opset: GRAPH_OPSET,
            producer: concat!("kerf ", env!("CARGO_PKG_VERSION")).to_string(),
            input: ValueInfo::batched("input", input_arity),
            output: ValueInfo::batched("output", output_arity),
            nodes,
        }
    }

    /// Declared input width
    pub fn input_arity(&self) -> Result<usize> {
        self.input
            .width()
            .ok_or_else(|| Error::Artifact("graph input must have shape [batch_size, width]".into()))
    }

    /// Declared output width
    pub fn output_arity(&self) -> Result<usize> {
        self.output
            .width()
            .ok_or_else(|| Error::Artifact("graph output must have shape [batch_size, width]".into()))
    }

    /// Check the format tag, opset and that node widths chain from input to output
    pub fn validate(&self) -> Result<()> {
        if self.format != GRAPH_FORMAT {
            return Err(Error::Artifact(format!("unknown artifact format '{}'", self.format)));
        }
        if self.opset != GRAPH_OPSET {
            return Err(Error::Artifact(format!(
                "unsupported opset {} (expected {GRAPH_OPSET})",
                self.opset
            )));
        }
        let width = chain_width(&self.nodes, self.input_arity()?)?;
        let expected = self.output_arity()?;
        if width != expected {
            return Err(Error::Artifact(format!(
                "graph produces {width} outputs but declares {expected}"
            )));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)
            .map_err(|e| Error::Serialization(format!("graph serialization failed: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate an artifact
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let graph: ModelGraph = serde_json::from_str(&content)
            .map_err(|e| Error::Artifact(format!("{} is not a model graph: {e}", path.display())))?;
        graph.validate()?;
        Ok(graph)
    }
}

/// Output width after running `nodes` on `width` input columns
fn chain_width(nodes: &[Node], mut width: usize) -> Result<usize> {
    for node in nodes {
        width = match node {
            Node::Gemm { inputs, outputs, weight, bias } => {
                let Some(cells) = inputs.checked_mul(*outputs) else {
                    return Err(Error::Artifact(format!("Gemm {inputs}x{outputs} is too large")));
                };
                if *inputs != width || weight.len() != cells || bias.len() != *outputs {
                    return Err(Error::Artifact(format!(
                        "Gemm {inputs}x{outputs} does not fit input width {width}"
                    )));
                }
                *outputs
            }
            Node::BatchNormalization { scale, bias, mean, var, .. } => {
                if [scale.len(), bias.len(), mean.len(), var.len()].iter().any(|&l| l != width) {
                    return Err(Error::Artifact(format!(
                        "BatchNormalization parameters do not match width {width}"
                    )));
                }
                width
            }
            Node::Concat { branches } => {
                if branches.is_empty() {
                    return Err(Error::Artifact("Concat needs at least one branch".into()));
                }
                let mut total = 0;
                for branch in branches {
                    total += chain_width(branch, width)?;
                }
                total
            }
            Node::Relu | Node::LeakyRelu { .. } | Node::Sigmoid => width,
        };
    }
    Ok(width)
}
