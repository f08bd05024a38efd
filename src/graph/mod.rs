//! Read and rewrite access to the host's dependency graph.
//!
//! The graph IR belongs to the host; this crate only sees it through
//! [GraphView] and [GraphRewrite]. Every node produces exactly one value, so
//! the output edges of a node are the edges to its consumers. [Function] is a
//! reference implementation of both traits.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use itertools::Itertools;

use crate::{ElementType, Error, Result};

mod function;

pub use function::{Function, FunctionSnapshot, NodeData};

/// Stable identity of a graph node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Operation performed by a node.
#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum OpKind {
    /// Graph input, bound at call time.
    Parameter {
        /// Whether the caller supplies a ciphertext.
        encrypted: bool,
    },
    /// Constant, always bound as a plaintext.
    Constant,
    Add,
    Subtract,
    Multiply,
    Negate,
    /// Brings a ciphertext back to the size bound.
    Relinearize,
    /// Graph output.
    Result,
    /// Any host operation this layer does not understand.
    Other(String),
}

impl OpKind {

    /// Number of inputs the operation takes, `None` for [OpKind::Other].
    pub fn arity(&self) -> Option<usize> {
        match self {
            OpKind::Parameter { .. } | OpKind::Constant => Some(0),
            OpKind::Negate | OpKind::Relinearize | OpKind::Result => Some(1),
            OpKind::Add | OpKind::Subtract | OpKind::Multiply => Some(2),
            OpKind::Other(_) => None,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            OpKind::Parameter { .. } => "parameter",
            OpKind::Constant => "constant",
            OpKind::Add => "add",
            OpKind::Subtract => "subtract",
            OpKind::Multiply => "multiply",
            OpKind::Negate => "negate",
            OpKind::Relinearize => "relinearize",
            OpKind::Result => "result",
            OpKind::Other(name) => name,
        }
    }
}

/// Read-only queries over a dependency graph.
///
/// Methods taking a [NodeId] panic if the node is not in the graph.
pub trait GraphView {
    /// All nodes, in ascending id order.
    fn nodes(&self) -> Vec<NodeId>;

    fn op(&self, node: NodeId) -> &OpKind;

    fn element_type(&self, node: NodeId) -> ElementType;

    /// Producers of the node's inputs, ordered by input port. A producer read
    /// on several ports appears several times.
    fn inputs(&self, node: NodeId) -> Vec<NodeId>;

    /// Nodes reading the node's output, deduplicated and in ascending order.
    fn consumers(&self, node: NodeId) -> Vec<NodeId>;
}

/// Edge-local rewriting of a dependency graph.
pub trait GraphRewrite: GraphView {
    /// Inserts a new single-input node of kind `op` on the edge from `producer`
    /// to `consumer`. Every input port of `consumer` reading `producer` is
    /// rewired to the new node; other consumers of `producer` are unaffected.
    ///
    /// Fails if `consumer` does not read `producer`.
    fn insert_between(&mut self, producer: NodeId, consumer: NodeId, op: OpKind) -> Result<NodeId>;
}

/// Orders the nodes so that every producer precedes its consumers.
///
/// Kahn's algorithm, seeded and fed in ascending id order so the result is
/// deterministic. Fails with [Error::CyclicGraph] if some nodes can never become
/// ready.
pub fn topological_order<G: GraphView + ?Sized>(graph: &G) -> Result<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut in_degree: HashMap<NodeId, usize> = nodes.iter()
        .map(|&n| (n, graph.inputs(n).into_iter().unique().count()))
        .collect();

    let mut ready: VecDeque<NodeId> = nodes.iter()
        .copied()
        .filter(|n| in_degree[n] == 0)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(node) = ready.pop_front() {
        order.push(node);
        for consumer in graph.consumers(node) {
            if let Some(degree) = in_degree.get_mut(&consumer) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(consumer);
                }
            }
        }
    }

    if order.len() != nodes.len() {
        return Err(Error::CyclicGraph { unvisited: nodes.len() - order.len() });
    }
    Ok(order)
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::Rng;

    use super::*;

    /// Builds a random DAG over the arithmetic operations, with two encrypted
    /// parameters, one plaintext parameter, one constant and three results.
    pub fn random_function<R: Rng>(rng: &mut R, op_count: usize, element_type: ElementType) -> Function {
        let mut f = Function::new();
        let mut values = vec![
            f.parameter(element_type, true),
            f.parameter(element_type, true),
            f.parameter(element_type, false),
            f.constant(element_type),
        ];
        for _ in 0..op_count {
            let a = values[rng.gen_range(0..values.len())];
            let b = values[rng.gen_range(0..values.len())];
            let node = match rng.gen_range(0..5) {
                0 => f.add(a, b),
                1 => f.subtract(a, b),
                2 | 3 => f.multiply(a, b),
                _ => f.negate(a),
            };
            values.push(node);
        }
        for &v in values.iter().rev().take(3) {
            f.result(v);
        }
        f
    }
}
