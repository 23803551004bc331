//! Feed-forward network assembled from layer specifications

use super::{StateDict, TabularModel};
use crate::autograd::{
    add_bias, batch_norm, batch_norm_inference, concat_cols, dropout, leaky_relu, matmul, relu,
    sigmoid, Tensor,
};
use crate::determinism::{DeterministicContext, Stream};
use crate::io::{ModelGraph, Node};
use crate::{Error, Result};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;

const BN_EPSILON: f32 = 1e-5;
const BN_MOMENTUM: f32 = 0.1;

/// Elementwise nonlinearity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Relu,
    LeakyRelu(f32),
    Sigmoid,
}

impl Activation {
    fn apply(self, x: &Tensor) -> Tensor {
        match self {
            Activation::Relu => relu(x),
            Activation::LeakyRelu(slope) => leaky_relu(x, slope),
            Activation::Sigmoid => sigmoid(x),
        }
    }

    fn node(self) -> Node {
        match self {
            Activation::Relu => Node::Relu,
            Activation::LeakyRelu(alpha) => Node::LeakyRelu { alpha },
            Activation::Sigmoid => Node::Sigmoid,
        }
    }
}

/// Architecture description, one entry per layer
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    /// Fully connected layer with the given output width
    Linear(usize),
    Activation(Activation),
    /// Per-feature batch normalization over the current width
    BatchNorm,
    /// Dropout probability in `[0, 1)`; inactive in inference mode
    Dropout(f32),
    /// Parallel heads over the same input, outputs concatenated in order
    Branches(Vec<Vec<LayerSpec>>),
}

struct Linear {
    weight: Tensor,
    bias: Tensor,
    inputs: usize,
    outputs: usize,
}

struct BatchNorm {
    gamma: Tensor,
    beta: Tensor,
    running_mean: Array1<f32>,
    running_var: Array1<f32>,
    features: usize,
}

impl BatchNorm {
    fn forward_train(&mut self, x: &Tensor, batch: usize) -> Tensor {
        let out = batch_norm(x, &self.gamma, &self.beta, batch, self.features, BN_EPSILON);
        // A single row has no unbiased variance; running stats keep their value
        if batch > 1 {
            let unbiased = &out.variance * (batch as f32 / (batch - 1) as f32);
            self.running_mean = &self.running_mean * (1.0 - BN_MOMENTUM) + &out.mean * BN_MOMENTUM;
            self.running_var = &self.running_var * (1.0 - BN_MOMENTUM) + &unbiased * BN_MOMENTUM;
        }
        out.output
    }

    fn forward_inference(&self, x: &Tensor, batch: usize) -> Tensor {
        batch_norm_inference(
            x,
            &self.gamma,
            &self.beta,
            &self.running_mean,
            &self.running_var,
            batch,
            self.features,
            BN_EPSILON,
        )
    }
}

enum Layer {
    Linear(Linear),
    Activation(Activation),
    BatchNorm(BatchNorm),
    Dropout(f32),
    Branches { branches: Vec<Vec<Layer>>, widths: Vec<usize> },
}

/// Generic multilayer perceptron implementing [`TabularModel`]
///
/// Linear layers use `U(-1/√fan_in, 1/√fan_in)` initialization drawn from the
/// context's init stream; dropout masks come from its dropout stream.
pub struct FeedForwardNet {
    layers: Vec<Layer>,
    input_arity: usize,
    output_arity: usize,
    training: bool,
    dropout_rng: StdRng,
}

impl FeedForwardNet {
    pub fn new(input_arity: usize, specs: &[LayerSpec], ctx: &DeterministicContext) -> Result<Self> {
        if input_arity == 0 {
            return Err(Error::Config("network input arity must be positive".into()));
        }
        let mut init_rng = ctx.rng(Stream::Init);
        let (layers, output_arity) = build(specs, input_arity, &mut init_rng)?;

        Ok(Self {
            layers,
            input_arity,
            output_arity,
            training: true,
            dropout_rng: ctx.rng(Stream::Dropout),
        })
    }
}

fn uniform_tensor(len: usize, bound: f32, rng: &mut StdRng) -> Tensor {
    Tensor::new(Array1::from_iter((0..len).map(|_| rng.random_range(-bound..=bound))), true)
}

fn build(specs: &[LayerSpec], mut width: usize, rng: &mut StdRng) -> Result<(Vec<Layer>, usize)> {
    let mut layers = Vec::with_capacity(specs.len());
    for spec in specs {
        let layer = match spec {
            LayerSpec::Linear(outputs) => {
                if *outputs == 0 {
                    return Err(Error::Config("linear layer width must be positive".into()));
                }
                let bound = 1.0 / (width as f32).sqrt();
                let layer = Linear {
                    weight: uniform_tensor(width * outputs, bound, rng),
                    bias: uniform_tensor(*outputs, bound, rng),
                    inputs: width,
                    outputs: *outputs,
                };
                width = *outputs;
                Layer::Linear(layer)
            }
            LayerSpec::Activation(a) => Layer::Activation(*a),
            LayerSpec::BatchNorm => Layer::BatchNorm(BatchNorm {
                gamma: Tensor::ones(width, true),
                beta: Tensor::zeros(width, true),
                running_mean: Array1::zeros(width),
                running_var: Array1::ones(width),
                features: width,
            }),
            LayerSpec::Dropout(p) => {
                if !(0.0..1.0).contains(p) {
                    return Err(Error::Config(format!("dropout probability {p} not in [0, 1)")));
                }
                Layer::Dropout(*p)
            }
            LayerSpec::Branches(specs) => {
                if specs.is_empty() {
                    return Err(Error::Config("branch layer needs at least one head".into()));
                }
                let mut branches = Vec::with_capacity(specs.len());
                let mut widths = Vec::with_capacity(specs.len());
                for branch in specs {
                    let (layers, w) = build(branch, width, rng)?;
                    branches.push(layers);
                    widths.push(w);
                }
                width = widths.iter().sum();
                Layer::Branches { branches, widths }
            }
        };
        layers.push(layer);
    }
    Ok((layers, width))
}

fn run(
    layers: &mut [Layer],
    input: &Tensor,
    mut width: usize,
    batch: usize,
    training: bool,
    rng: &mut StdRng,
) -> Tensor {
    let mut x = input.clone();
    for layer in layers.iter_mut() {
        x = match layer {
            Layer::Linear(l) => {
                width = l.outputs;
                let y = matmul(&x, &l.weight, batch, l.inputs, l.outputs);
                add_bias(&y, &l.bias, batch, l.outputs)
            }
            Layer::Activation(a) => a.apply(&x),
            Layer::BatchNorm(bn) if training => bn.forward_train(&x, batch),
            Layer::BatchNorm(bn) => bn.forward_inference(&x, batch),
            Layer::Dropout(p) if training && *p > 0.0 => dropout(&x, *p, rng),
            Layer::Dropout(_) => x,
            Layer::Branches { branches, widths } => {
                let heads: Vec<Tensor> =
                    branches.iter_mut().map(|b| run(b, &x, width, batch, training, rng)).collect();
                width = widths.iter().sum();
                let refs: Vec<&Tensor> = heads.iter().collect();
                concat_cols(&refs, widths, batch)
            }
        };
    }
    x
}

fn collect_params<'a>(layers: &'a mut [Layer], out: &mut Vec<&'a mut Tensor>) {
    for layer in layers.iter_mut() {
        match layer {
            Layer::Linear(l) => {
                out.push(&mut l.weight);
                out.push(&mut l.bias);
            }
            Layer::BatchNorm(bn) => {
                out.push(&mut bn.gamma);
                out.push(&mut bn.beta);
            }
            Layer::Branches { branches, .. } => {
                for branch in branches.iter_mut() {
                    collect_params(branch, out);
                }
            }
            Layer::Activation(_) | Layer::Dropout(_) => {}
        }
    }
}

fn count_params(layers: &[Layer]) -> usize {
    layers
        .iter()
        .map(|layer| match layer {
            Layer::Linear(l) => l.weight.len() + l.bias.len(),
            Layer::BatchNorm(bn) => bn.gamma.len() + bn.beta.len(),
            Layer::Branches { branches, .. } => branches.iter().map(|b| count_params(b)).sum(),
            Layer::Activation(_) | Layer::Dropout(_) => 0,
        })
        .sum()
}

fn collect_state(layers: &[Layer], prefix: &str, out: &mut StateDict) {
    for (i, layer) in layers.iter().enumerate() {
        let key = |name: &str| format!("{prefix}{i}.{name}");
        match layer {
            Layer::Linear(l) => {
                out.insert(key("weight"), l.weight.data().clone());
                out.insert(key("bias"), l.bias.data().clone());
            }
            Layer::BatchNorm(bn) => {
                out.insert(key("gamma"), bn.gamma.data().clone());
                out.insert(key("beta"), bn.beta.data().clone());
                out.insert(key("running_mean"), bn.running_mean.clone());
                out.insert(key("running_var"), bn.running_var.clone());
            }
            Layer::Branches { branches, .. } => {
                for (j, branch) in branches.iter().enumerate() {
                    collect_state(branch, &format!("{prefix}{i}.branch{j}."), out);
                }
            }
            Layer::Activation(_) | Layer::Dropout(_) => {}
        }
    }
}

fn take(state: &StateDict, key: &str, len: usize) -> Result<Array1<f32>> {
    let value = state
        .get(key)
        .ok_or_else(|| Error::Artifact(format!("state dict is missing '{key}'")))?;
    if value.len() != len {
        return Err(Error::Artifact(format!(
            "state dict entry '{key}' has {} values, expected {len}",
            value.len()
        )));
    }
    Ok(value.clone())
}

fn restore_state(layers: &mut [Layer], prefix: &str, state: &StateDict) -> Result<()> {
    for (i, layer) in layers.iter_mut().enumerate() {
        let key = |name: &str| format!("{prefix}{i}.{name}");
        match layer {
            Layer::Linear(l) => {
                *l.weight.data_mut() = take(state, &key("weight"), l.weight.len())?;
                *l.bias.data_mut() = take(state, &key("bias"), l.bias.len())?;
            }
            Layer::BatchNorm(bn) => {
                *bn.gamma.data_mut() = take(state, &key("gamma"), bn.features)?;
                *bn.beta.data_mut() = take(state, &key("beta"), bn.features)?;
                bn.running_mean = take(state, &key("running_mean"), bn.features)?;
                bn.running_var = take(state, &key("running_var"), bn.features)?;
            }
            Layer::Branches { branches, .. } => {
                for (j, branch) in branches.iter_mut().enumerate() {
                    restore_state(branch, &format!("{prefix}{i}.branch{j}."), state)?;
                }
            }
            Layer::Activation(_) | Layer::Dropout(_) => {}
        }
    }
    Ok(())
}

fn graph_nodes(layers: &[Layer]) -> Vec<Node> {
    layers
        .iter()
        .filter_map(|layer| match layer {
            Layer::Linear(l) => Some(Node::Gemm {
                inputs: l.inputs,
                outputs: l.outputs,
                weight: l.weight.data().to_vec(),
                bias: l.bias.data().to_vec(),
            }),
            Layer::Activation(a) => Some(a.node()),
            Layer::BatchNorm(bn) => Some(Node::BatchNormalization {
                scale: bn.gamma.data().to_vec(),
                bias: bn.beta.data().to_vec(),
                mean: bn.running_mean.to_vec(),
                var: bn.running_var.to_vec(),
                epsilon: BN_EPSILON,
            }),
            Layer::Dropout(_) => None,
            Layer::Branches { branches, .. } => {
                Some(Node::Concat { branches: branches.iter().map(|b| graph_nodes(b)).collect() })
            }
        })
        .collect()
}

impl TabularModel for FeedForwardNet {
    fn input_arity(&self) -> usize {
        self.input_arity
    }

    fn output_arity(&self) -> usize {
        self.output_arity
    }

    fn parameter_count(&self) -> usize {
        count_params(&self.layers)
    }

    fn forward(&mut self, input: &Tensor, batch: usize) -> Tensor {
        assert_eq!(input.len(), batch * self.input_arity, "input size mismatch");
        run(&mut self.layers, input, self.input_arity, batch, self.training, &mut self.dropout_rng)
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        collect_params(&mut self.layers, &mut params);
        params
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn state_dict(&self) -> StateDict {
        let mut state = StateDict::new();
        collect_state(&self.layers, "layers.", &mut state);
        state
    }

    fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        restore_state(&mut self.layers, "layers.", state)
    }

    fn to_graph(&self) -> ModelGraph {
        ModelGraph::new(self.input_arity, self.output_arity, graph_nodes(&self.layers))
    }
}
