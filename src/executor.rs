use std::collections::HashMap;

use crate::graph::topological_order;
use crate::{kernel, Backend, ElementType, EncryptedValue, Error, GraphView, NodeId, OpKind, Result, ValueKind};

type BinaryKernel<B> = fn(&EncryptedValue, &EncryptedValue, &mut EncryptedValue, ElementType, &B) -> Result<()>;

/// Evaluates a call graph over encrypted values, one kernel dispatch per node.
///
/// The graph is expected to have been through
/// [InsertRelinearize](crate::InsertRelinearize); otherwise a ciphertext above
/// the size bound may reach a multiplication and the call fails with
/// [Error::CiphertextSizeExceeded].
pub struct Executor<'a, B: Backend> {
    backend: &'a B,
}

impl<'a, B: Backend> Executor<'a, B> {

    pub fn new(backend: &'a B) -> Self {
        Executor { backend }
    }

    /// Evaluates `graph`.
    ///
    /// `inputs` binds every parameter and constant node to its value; encrypted
    /// parameters take ciphertexts, constants and plaintext parameters take
    /// plaintexts. Returns the value of every [OpKind::Result] node, in
    /// ascending id order.
    pub fn call<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        mut inputs: HashMap<NodeId, EncryptedValue>,
    ) -> Result<Vec<(NodeId, EncryptedValue)>> {
        let order = topological_order(graph)?;
        let mut values: HashMap<NodeId, EncryptedValue> = HashMap::with_capacity(order.len());

        for node in order {
            let op = graph.op(node);
            let element_type = graph.element_type(node);
            let args = graph.inputs(node);
            let expected = op.arity().ok_or_else(|| Error::UnsupportedOperation(op.name().to_string()))?;
            if args.len() != expected {
                return Err(Error::InvalidArity { node, expected, found: args.len() });
            }
            tracing::trace!(%node, op = op.name(), %element_type, "Executing");

            let arg = |i: usize| values.get(&args[i]).ok_or(Error::MissingInput(args[i]));
            let value = match op {
                OpKind::Parameter { encrypted } => {
                    let expected = if *encrypted {ValueKind::Cipher} else {ValueKind::Plain};
                    bind_input(node, &mut inputs, expected, element_type)?
                }
                OpKind::Constant => bind_input(node, &mut inputs, ValueKind::Plain, element_type)?,
                OpKind::Add | OpKind::Subtract | OpKind::Multiply => {
                    let (left, right) = (arg(0)?, arg(1)?);
                    let mut out = self.allocate(left.kind().combine(right.kind()), element_type, left.slot_count());
                    let dispatch: BinaryKernel<B> = match op {
                        OpKind::Add => kernel::add,
                        OpKind::Subtract => kernel::subtract,
                        _ => kernel::multiply,
                    };
                    dispatch(left, right, &mut out, element_type, self.backend)?;
                    out
                }
                OpKind::Negate | OpKind::Relinearize => {
                    let input = arg(0)?;
                    let mut out = self.allocate(input.kind(), element_type, input.slot_count());
                    if *op == OpKind::Negate {
                        kernel::negate(input, &mut out, element_type, self.backend)?;
                    } else {
                        kernel::relinearize(input, &mut out, element_type, self.backend)?;
                    }
                    out
                }
                OpKind::Result => arg(0)?.clone(),
                OpKind::Other(name) => return Err(Error::UnsupportedOperation(name.clone())),
            };
            values.insert(node, value);
        }

        let mut results: Vec<_> = values.into_iter()
            .filter(|(node, _)| *graph.op(*node) == OpKind::Result)
            .collect();
        results.sort_by_key(|(node, _)| *node);
        Ok(results)
    }

    fn allocate(&self, kind: ValueKind, element_type: ElementType, slot_count: usize) -> EncryptedValue {
        EncryptedValue::allocate(kind, self.backend.context(), element_type, slot_count)
    }
}

fn bind_input(
    node: NodeId,
    inputs: &mut HashMap<NodeId, EncryptedValue>,
    expected: ValueKind,
    element_type: ElementType,
) -> Result<EncryptedValue> {
    let value = inputs.remove(&node).ok_or(Error::MissingInput(node))?;
    if value.kind() != expected {
        return Err(Error::InvalidInput {
            node,
            reason: format!("expected a {}, found a {}", expected.name(), value.kind().name()),
        });
    }
    if value.element_type() != element_type {
        return Err(Error::InvalidInput {
            node,
            reason: format!("expected {element_type} values, found {}", value.element_type()),
        });
    }
    Ok(value)
}
