use std::collections::HashMap;

use itertools::Itertools;

use super::{CallGraphPass, ValueState};
use crate::graph::topological_order;
use crate::{util, Error, GraphRewrite, GraphView, NodeId, OpKind, Result};

/// Inserts relinearizations so that no ciphertext above the size bound reaches
/// a ciphertext-ciphertext multiplication or a graph output.
///
/// The graph is walked in dependency order while the [ValueState] of every
/// node is inferred from its inputs. Whenever an oversized ciphertext flows
/// into an unsafe consumer, a relinearization is planned on exactly that
/// edge; other consumers of the same producer keep reading it directly. A
/// consumer reading the producer on several ports shares one relinearization.
///
/// Insertions are only applied once the whole graph has been analyzed, so a
/// cycle or an unknown operation is reported without touching the graph.
/// Running the pass again on its own output changes nothing.
#[derive(Debug)]
pub struct InsertRelinearize {
    size_bound: usize,
    inserted: Vec<NodeId>,
}

impl Default for InsertRelinearize {
    fn default() -> Self {
        Self::new()
    }
}

impl InsertRelinearize {

    pub fn new() -> Self {
        InsertRelinearize { size_bound: util::HE_CIPHERTEXT_SIZE_MIN, inserted: vec![] }
    }

    /// Nodes inserted by the last run.
    pub fn inserted(&self) -> &[NodeId] {
        &self.inserted
    }

    /// Verifies that no unsafe consumer receives an oversized ciphertext,
    /// without rewriting anything.
    pub fn check<G: GraphView + ?Sized>(&self, graph: &G) -> Result<()> {
        let bound = self.size_bound;
        self.walk(graph, |_, _, state| {
            Err(Error::CiphertextSizeExceeded { size: state.size(), bound })
        })?;
        Ok(())
    }

    /// Infers the state of every node. `on_oversized` is called for every
    /// (producer, consumer) pair where an oversized ciphertext reaches an unsafe
    /// consumer; if it returns true the edge is treated as relinearized.
    fn walk<G, F>(&self, graph: &G, mut on_oversized: F) -> Result<HashMap<NodeId, ValueState>>
    where
        G: GraphView + ?Sized,
        F: FnMut(NodeId, NodeId, ValueState) -> Result<bool>,
    {
        let order = topological_order(graph)?;
        let mut states: HashMap<NodeId, ValueState> = HashMap::with_capacity(order.len());

        for node in order {
            let op = graph.op(node);
            let inputs = graph.inputs(node);
            let expected = op.arity().ok_or_else(|| Error::UnsupportedOperation(op.name().to_string()))?;
            if inputs.len() != expected {
                return Err(Error::InvalidArity { node, expected, found: inputs.len() });
            }

            let mut input_states: Vec<ValueState> = inputs.iter()
                .map(|producer| states.get(producer).copied().unwrap_or(ValueState::Plain))
                .collect();

            if is_unsafe_consumer(op, &input_states) {
                for &producer in inputs.iter().unique() {
                    let state = states.get(&producer).copied().unwrap_or(ValueState::Plain);
                    if state.is_oversized(self.size_bound) && on_oversized(producer, node, state)? {
                        let relinearized = ValueState::Cipher { size: self.size_bound };
                        inputs.iter()
                            .zip(input_states.iter_mut())
                            .filter(|(p, _)| **p == producer)
                            .for_each(|(_, s)| *s = relinearized);
                    }
                }
            }

            let state = infer_state(op, &input_states, self.size_bound)?;
            states.insert(node, state);
        }
        Ok(states)
    }
}

/// Consumers that must never see an oversized ciphertext.
fn is_unsafe_consumer(op: &OpKind, input_states: &[ValueState]) -> bool {
    match op {
        OpKind::Multiply => input_states.iter().all(ValueState::is_cipher),
        OpKind::Result => true,
        _ => false,
    }
}

fn infer_state(op: &OpKind, inputs: &[ValueState], bound: usize) -> Result<ValueState> {
    let cipher_sizes = || inputs.iter().filter(|s| s.is_cipher()).map(ValueState::size);
    let state = match op {
        OpKind::Parameter { encrypted: true } => ValueState::Cipher { size: bound },
        OpKind::Parameter { encrypted: false } | OpKind::Constant => ValueState::Plain,
        OpKind::Add | OpKind::Subtract => match cipher_sizes().max() {
            Some(size) => ValueState::Cipher { size },
            None => ValueState::Plain,
        },
        OpKind::Multiply => match (inputs[0], inputs[1]) {
            (ValueState::Cipher { size: a }, ValueState::Cipher { size: b }) => ValueState::Cipher { size: a + b - 1 },
            (ValueState::Cipher { size }, ValueState::Plain)
            | (ValueState::Plain, ValueState::Cipher { size }) => ValueState::Cipher { size },
            (ValueState::Plain, ValueState::Plain) => ValueState::Plain,
        },
        OpKind::Negate | OpKind::Result => inputs[0],
        OpKind::Relinearize => match inputs[0] {
            ValueState::Cipher { size } => ValueState::Cipher { size: size.min(bound) },
            ValueState::Plain => ValueState::Plain,
        },
        OpKind::Other(name) => return Err(Error::UnsupportedOperation(name.clone())),
    };
    Ok(state)
}

impl CallGraphPass for InsertRelinearize {

    fn name(&self) -> &'static str {
        "insert-relinearize"
    }

    fn run_on_call_graph<G: GraphRewrite>(&mut self, graph: &mut G) -> Result<bool> {
        self.inserted.clear();

        let mut plan: Vec<(NodeId, NodeId, ValueState)> = vec![];
        self.walk(&*graph, |producer, consumer, state| {
            plan.push((producer, consumer, state));
            Ok(true)
        })?;

        for (producer, consumer, state) in plan {
            let node = graph.insert_between(producer, consumer, OpKind::Relinearize)?;
            tracing::debug!(%producer, %consumer, size = state.size(), inserted = %node, "Inserted relinearization");
            self.inserted.push(node);
        }

        tracing::info!(pass = self.name(), inserted = self.inserted.len(), "Pass finished");
        Ok(!self.inserted.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::graph::testing::random_function;
    use crate::{ElementType, Function};

    const TY: ElementType = ElementType::I64;

    fn run(f: &mut Function) -> (bool, Vec<NodeId>) {
        let mut pass = InsertRelinearize::new();
        let changed = pass.run_on_call_graph(f).unwrap();
        (changed, pass.inserted().to_vec())
    }

    #[test]
    fn test_square_of_square() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let p = f.multiply(x, x);
        let q = f.multiply(p, p);
        let r = f.result(q);
        assert_eq!(
            InsertRelinearize::new().check(&f),
            Err(Error::CiphertextSizeExceeded { size: 3, bound: 2 })
        );

        let (changed, inserted) = run(&mut f);
        assert!(changed);
        assert_eq!(inserted.len(), 2);
        let (rp, rq) = (inserted[0], inserted[1]);
        assert_eq!(f.op(rp), &OpKind::Relinearize);
        assert_eq!(f.inputs(rp), vec![p]);
        // One relinearization feeds both ports
        assert_eq!(f.inputs(q), vec![rp, rp]);
        assert_eq!(f.inputs(rq), vec![q]);
        assert_eq!(f.inputs(r), vec![rq]);
        assert!(InsertRelinearize::new().check(&f).is_ok());
    }

    #[test]
    fn test_only_unsafe_edges_relinearized() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let c = f.constant(TY);
        let p = f.multiply(x, x);
        let sum = f.add(p, x);
        let scaled = f.multiply(p, c);
        let negated = f.negate(p);
        let q = f.multiply(p, x);
        let r = f.result(negated);

        let (_, inserted) = run(&mut f);
        assert_eq!(inserted.len(), 2);
        assert_eq!(f.inputs(sum), vec![p, x]);
        assert_eq!(f.inputs(scaled), vec![p, c]);
        assert_eq!(f.inputs(negated), vec![p]);
        assert_eq!(f.inputs(q), vec![inserted[0], x]);
        assert_eq!(f.inputs(r), vec![inserted[1]]);
        assert_eq!(f.inputs(inserted[1]), vec![negated]);
        assert_eq!(f.consumers(p), vec![sum, scaled, negated, inserted[0]]);
    }

    #[test]
    fn test_plain_and_fresh_values_untouched() {
        let mut f = Function::new();
        let a = f.constant(TY);
        let b = f.parameter(TY, false);
        let x = f.parameter(TY, true);
        let pp = f.multiply(a, b);
        let ppp = f.multiply(pp, pp);
        let cp = f.multiply(x, ppp);
        f.result(cp);
        f.result(ppp);
        let before = f.snapshot();
        assert_eq!(run(&mut f), (false, vec![]));
        assert_eq!(f.snapshot(), before);
    }

    #[test]
    fn test_idempotent() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let y = f.parameter(TY, true);
        let p = f.multiply(x, y);
        let q = f.multiply(p, y);
        let s = f.add(q, p);
        f.result(s);
        let (changed, _) = run(&mut f);
        assert!(changed);
        let after_first = f.snapshot();
        assert_eq!(run(&mut f), (false, vec![]));
        assert_eq!(f.snapshot(), after_first);
    }

    #[test]
    fn test_cycle_leaves_graph_unchanged() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let p = f.multiply(x, x);
        let q = f.multiply(p, p);
        let n = f.negate(q);
        f.result(n);
        f.replace_input(p, 1, n).unwrap();
        let before = bincode::serialize(&f.snapshot()).unwrap();

        let mut pass = InsertRelinearize::new();
        let err = pass.run_on_call_graph(&mut f).unwrap_err();
        assert!(matches!(err, Error::CyclicGraph { .. }));
        assert_eq!(bincode::serialize(&f.snapshot()).unwrap(), before);
        assert!(pass.inserted().is_empty());
    }

    #[test]
    fn test_unknown_op_leaves_graph_unchanged() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let p = f.multiply(x, x);
        let q = f.multiply(p, p);
        let conv = f.add_op(OpKind::Other("conv2d".into()), TY, &[q]);
        f.result(conv);
        let before = f.snapshot();

        let err = InsertRelinearize::new().run_on_call_graph(&mut f).unwrap_err();
        assert_eq!(err, Error::UnsupportedOperation("conv2d".into()));
        assert_eq!(f.snapshot(), before);
    }

    #[test]
    fn test_invalid_arity() {
        let mut f = Function::new();
        let x = f.parameter(TY, true);
        let bad = f.add_op(OpKind::Add, TY, &[x]);
        assert_eq!(
            InsertRelinearize::new().run_on_call_graph(&mut f),
            Err(Error::InvalidArity { node: bad, expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_random_dags() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let mut f = random_function(&mut rng, 40, TY);
            let mut pass = InsertRelinearize::new();
            pass.run_on_call_graph(&mut f).unwrap();
            pass.check(&f).unwrap();
            for &node in pass.inserted() {
                assert_eq!(f.inputs(node).len(), 1);
                let consumers = f.consumers(node);
                assert_eq!(consumers.len(), 1);
                assert!(matches!(f.op(consumers[0]), OpKind::Multiply | OpKind::Result));
            }
            assert!(!pass.run_on_call_graph(&mut f).unwrap());
        }
    }
}
