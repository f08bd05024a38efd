use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};

use super::{GraphRewrite, GraphView, NodeId, OpKind};
use crate::{ElementType, Error, Result};

/// Payload of a [Function] node.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct NodeData {
    pub op: OpKind,
    pub element_type: ElementType,
}

/// Order-independent dump of a [Function], for comparing graphs.
#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub struct FunctionSnapshot {
    pub nodes: Vec<(NodeId, NodeData)>,
    /// `(producer, consumer, port)`, sorted.
    pub edges: Vec<(NodeId, NodeId, usize)>,
}

/// A simple host call graph.
///
/// Nodes live in a [StableDiGraph], so their ids survive rewrites. An edge
/// goes from producer to consumer and carries the consumer's input port.
///
/// ```rust
/// use hexec::*;
/// let mut f = Function::new();
/// let x = f.parameter(ElementType::F64, true);
/// let sq = f.multiply(x, x);
/// f.result(sq);
/// assert_eq!(f.inputs(sq), vec![x, x]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Function {
    graph: StableDiGraph<NodeData, usize>,
}

fn index(node: NodeId) -> NodeIndex {
    NodeIndex::new(node.0 as usize)
}

fn id(index: NodeIndex) -> NodeId {
    NodeId(index.index() as u32)
}

impl Function {

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node reading `inputs` in port order.
    pub fn add_op(&mut self, op: OpKind, element_type: ElementType, inputs: &[NodeId]) -> NodeId {
        let node = self.graph.add_node(NodeData { op, element_type });
        for (port, &input) in inputs.iter().enumerate() {
            self.graph.add_edge(index(input), node, port);
        }
        id(node)
    }

    pub fn parameter(&mut self, element_type: ElementType, encrypted: bool) -> NodeId {
        self.add_op(OpKind::Parameter { encrypted }, element_type, &[])
    }

    pub fn constant(&mut self, element_type: ElementType) -> NodeId {
        self.add_op(OpKind::Constant, element_type, &[])
    }

    pub fn add(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(OpKind::Add, left, right)
    }

    pub fn subtract(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(OpKind::Subtract, left, right)
    }

    pub fn multiply(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(OpKind::Multiply, left, right)
    }

    pub fn negate(&mut self, input: NodeId) -> NodeId {
        let element_type = self.element_type(input);
        self.add_op(OpKind::Negate, element_type, &[input])
    }

    pub fn result(&mut self, input: NodeId) -> NodeId {
        let element_type = self.element_type(input);
        self.add_op(OpKind::Result, element_type, &[input])
    }

    fn binary(&mut self, op: OpKind, left: NodeId, right: NodeId) -> NodeId {
        let element_type = self.element_type(left);
        self.add_op(op, element_type, &[left, right])
    }

    /// The graph outputs, in ascending id order.
    pub fn results(&self) -> Vec<NodeId> {
        self.graph.node_indices()
            .filter(|&n| self.graph[n].op == OpKind::Result)
            .map(id)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Points input `port` of `consumer` at `producer`. No acyclicity check is
    /// made.
    pub fn replace_input(&mut self, consumer: NodeId, port: usize, producer: NodeId) -> Result<()> {
        let edge = self.graph.edges_directed(index(consumer), Incoming)
            .find(|e| *e.weight() == port)
            .map(|e| e.id())
            .ok_or_else(|| Error::InvalidInput {
                node: consumer,
                reason: format!("no input port {port}"),
            })?;
        self.graph.remove_edge(edge);
        self.graph.add_edge(index(producer), index(consumer), port);
        Ok(())
    }

    pub fn snapshot(&self) -> FunctionSnapshot {
        let nodes = self.graph.node_indices()
            .map(|n| (id(n), self.graph[n].clone()))
            .collect();
        let mut edges: Vec<_> = self.graph.edge_indices()
            .filter_map(|e| {
                let (source, target) = self.graph.edge_endpoints(e)?;
                Some((id(source), id(target), self.graph[e]))
            })
            .collect();
        edges.sort();
        FunctionSnapshot { nodes, edges }
    }
}

impl GraphView for Function {

    fn nodes(&self) -> Vec<NodeId> {
        self.graph.node_indices().map(id).collect()
    }

    fn op(&self, node: NodeId) -> &OpKind {
        &self.graph[index(node)].op
    }

    fn element_type(&self, node: NodeId) -> ElementType {
        self.graph[index(node)].element_type
    }

    fn inputs(&self, node: NodeId) -> Vec<NodeId> {
        let mut ports: Vec<(usize, NodeId)> = self.graph.edges_directed(index(node), Incoming)
            .map(|e| (*e.weight(), id(e.source())))
            .collect();
        ports.sort();
        ports.into_iter().map(|(_, producer)| producer).collect()
    }

    fn consumers(&self, node: NodeId) -> Vec<NodeId> {
        let mut consumers: Vec<NodeId> = self.graph.neighbors_directed(index(node), Outgoing)
            .map(id)
            .collect();
        consumers.sort();
        consumers.dedup();
        consumers
    }
}

impl GraphRewrite for Function {

    fn insert_between(&mut self, producer: NodeId, consumer: NodeId, op: OpKind) -> Result<NodeId> {
        let ports: Vec<_> = self.graph.edges_directed(index(consumer), Incoming)
            .filter(|e| e.source() == index(producer))
            .map(|e| (e.id(), *e.weight()))
            .collect();
        if ports.is_empty() {
            return Err(Error::InvalidInput {
                node: consumer,
                reason: format!("does not read {producer}"),
            });
        }
        let element_type = self.element_type(producer);
        let inserted = self.graph.add_node(NodeData { op, element_type });
        self.graph.add_edge(index(producer), inserted, 0);
        for (edge, port) in ports {
            self.graph.remove_edge(edge);
            self.graph.add_edge(inserted, index(consumer), port);
        }
        Ok(id(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let mut f = Function::new();
        let x = f.parameter(ElementType::F32, true);
        let c = f.constant(ElementType::F32);
        let d = f.subtract(c, x);
        let r = f.result(d);
        assert_eq!(f.node_count(), 4);
        assert_eq!(f.op(d), &OpKind::Subtract);
        assert_eq!(f.element_type(d), ElementType::F32);
        assert_eq!(f.inputs(d), vec![c, x]);
        assert_eq!(f.consumers(x), vec![d]);
        assert_eq!(f.results(), vec![r]);
    }

    #[test]
    fn test_insert_between_is_edge_local() {
        let mut f = Function::new();
        let x = f.parameter(ElementType::I64, true);
        let p = f.multiply(x, x);
        let q = f.multiply(p, p);
        let s = f.add(p, x);
        let inserted = f.insert_between(p, q, OpKind::Relinearize).unwrap();

        assert_eq!(f.inputs(q), vec![inserted, inserted]);
        assert_eq!(f.inputs(inserted), vec![p]);
        assert_eq!(f.inputs(s), vec![p, x]);
        assert_eq!(f.consumers(p), vec![s, inserted]);
        assert_eq!(f.element_type(inserted), ElementType::I64);

        assert!(matches!(f.insert_between(q, s, OpKind::Relinearize), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_replace_input() {
        let mut f = Function::new();
        let x = f.parameter(ElementType::I32, true);
        let y = f.parameter(ElementType::I32, true);
        let s = f.subtract(x, y);
        f.replace_input(s, 1, x).unwrap();
        assert_eq!(f.inputs(s), vec![x, x]);
        assert!(f.replace_input(s, 2, x).is_err());
        assert_eq!(f.snapshot().edges, vec![(x, s, 0), (x, s, 1)]);
    }
}
