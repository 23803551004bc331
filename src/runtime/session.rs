//! Native evaluator for `kerf-graph` artifacts

use super::Scorer;
use crate::io::{ModelGraph, Node};
use crate::{Error, Result};
use ndarray::{concatenate, Array1, Array2, Axis};
use std::path::Path;

/// Node with its parameters laid out for evaluation
enum Op {
    Gemm { weight: Array2<f32>, bias: Array1<f32> },
    Relu,
    LeakyRelu(f32),
    Sigmoid,
    /// Batch norm folded into `x * scale + shift`
    Affine { scale: Array1<f32>, shift: Array1<f32> },
    Concat(Vec<Vec<Op>>),
}

fn compile(nodes: &[Node]) -> Result<Vec<Op>> {
    nodes
        .iter()
        .map(|node| {
            Ok(match node {
                Node::Gemm { inputs, outputs, weight, bias } => Op::Gemm {
                    weight: Array2::from_shape_vec((*inputs, *outputs), weight.clone())
                        .map_err(|e| Error::Artifact(format!("Gemm weight: {e}")))?,
                    bias: Array1::from_vec(bias.clone()),
                },
                Node::Relu => Op::Relu,
                Node::LeakyRelu { alpha } => Op::LeakyRelu(*alpha),
                Node::Sigmoid => Op::Sigmoid,
                Node::BatchNormalization { scale, bias, mean, var, epsilon } => {
                    let scale: Array1<f32> = scale
                        .iter()
                        .zip(var)
                        .map(|(&g, &v)| g / (v + epsilon).sqrt())
                        .collect();
                    let shift = bias.iter().zip(mean).zip(&scale).map(|((&b, &m), &s)| b - m * s).collect();
                    Op::Affine { scale, shift }
                }
                Node::Concat { branches } => {
                    Op::Concat(branches.iter().map(|b| compile(b)).collect::<Result<_>>()?)
                }
            })
        })
        .collect()
}

fn eval(ops: &[Op], input: &Array2<f32>) -> Result<Array2<f32>> {
    let mut x = input.clone();
    for op in ops {
        x = match op {
            Op::Gemm { weight, bias } => x.dot(weight) + bias,
            Op::Relu => x.mapv_into(|v| v.max(0.0)),
            Op::LeakyRelu(alpha) => x.mapv_into(|v| if v > 0.0 { v } else { alpha * v }),
            Op::Sigmoid => x.mapv_into(crate::autograd::sigmoid_scalar),
            Op::Affine { scale, shift } => x * scale + shift,
            Op::Concat(branches) => {
                let heads = branches.iter().map(|b| eval(b, &x)).collect::<Result<Vec<_>>>()?;
                let views: Vec<_> = heads.iter().map(|h| h.view()).collect();
                concatenate(Axis(1), &views).map_err(|e| Error::Artifact(format!("Concat: {e}")))?
            }
        };
    }
    Ok(x)
}

/// Loaded graph ready to score any number of rows
pub struct GraphSession {
    ops: Vec<Op>,
    input_arity: usize,
    output_arity: usize,
}

impl GraphSession {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_graph(&ModelGraph::load(path)?)
    }

    pub fn from_graph(graph: &ModelGraph) -> Result<Self> {
        graph.validate()?;
        Ok(Self {
            ops: compile(&graph.nodes)?,
            input_arity: graph.input_arity()?,
            output_arity: graph.output_arity()?,
        })
    }
}

impl Scorer for GraphSession {
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
        eval(&self.ops, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::determinism::DeterministicContext;
    use crate::models::{ModelKind, TabularModel};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_gemm_sigmoid() {
        let graph = ModelGraph::new(
            2,
            1,
            vec![Node::Gemm { inputs: 2, outputs: 1, weight: vec![1.0, -1.0], bias: vec![0.0] }, Node::Sigmoid],
        );
        let mut session = GraphSession::from_graph(&graph).expect("valid graph");
        let out = session.score(&array![[1.0, 1.0], [2.0, 0.0]]).expect("scores");
        assert_abs_diff_eq!(out[[0, 0]], 0.5, epsilon = 1e-6);
        assert!(out[[1, 0]] > 0.85);
    }

    #[test]
    fn test_width_mismatch_is_input_error() {
        let graph = ModelGraph::new(1, 1, vec![Node::Relu]);
        let mut session = GraphSession::from_graph(&graph).expect("valid graph");
        assert!(matches!(session.score(&array![[1.0, 2.0]]), Err(Error::Input(_))));
    }

    #[test]
    fn test_graph_matches_network_in_inference_mode() {
        let ctx = DeterministicContext::new(21);
        for kind in ModelKind::ALL {
            let mut net = kind.build(&ctx).expect("registered architecture");
            // Move running statistics away from their initial values
            let warm = Array2::from_shape_fn((16, kind.input_arity()), |(r, c)| ((r * 7 + c) as f32).cos());
            net.predict(&warm);
            net.set_training(false);

            let rows = Array2::from_shape_fn((5, kind.input_arity()), |(r, c)| ((r + c) as f32 * 0.3).sin());
            let expected = net.predict(&rows);
            let mut session = GraphSession::from_graph(&net.to_graph()).expect("exported graph");
            let actual = session.score(&rows).expect("scores");
            for (a, e) in actual.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(a, e, epsilon = 1e-4);
            }
        }
    }
}
