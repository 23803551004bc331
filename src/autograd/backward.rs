//! Backward operation trait and reverse-mode traversal

use super::Tensor;
use ndarray::Array1;
use std::collections::HashSet;

/// Local gradient rule attached to the output of a differentiable operation
///
/// `backward` reads the output gradient and accumulates into the inputs'
/// gradient cells. It never recurses; [`backward`] orders the calls.
pub trait BackwardOp {
    /// Propagate the output gradient to the operation's inputs
    fn backward(&self);

    /// Inputs of the operation, for graph traversal
    fn inputs(&self) -> Vec<&Tensor>;
}

/// Run reverse-mode differentiation from `root`
///
/// Seeds the root gradient with `grad_output` (ones when `None`) and calls
/// every reachable backward operation exactly once, in reverse topological
/// order, so subgraphs shared by several consumers receive their full
/// gradient before propagating it.
pub fn backward(root: &Tensor, grad_output: Option<Array1<f32>>) {
    let seed = grad_output.unwrap_or_else(|| Array1::ones(root.len()));
    root.set_grad(seed);

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    topological_order(root, &mut visited, &mut order);

    for node in order.iter().rev() {
        if let Some(op) = node.backward_op() {
            op.backward();
        }
    }
}

fn topological_order(node: &Tensor, visited: &mut HashSet<usize>, order: &mut Vec<Tensor>) {
    if !visited.insert(node.node_id()) {
        return;
    }
    if let Some(op) = node.backward_op() {
        for input in op.inputs() {
            topological_order(input, visited, order);
        }
    }
    order.push(node.clone());
}
