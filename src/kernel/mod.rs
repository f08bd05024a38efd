//! Arithmetic kernel dispatch table.
//!
//! Each binary operation family exposes four concrete entry points, one per
//! combination of operand representations, plus a dispatcher that selects the
//! entry with an exhaustive `match` over the [EncryptedValue] variants of the
//! operands and the output slot. Results are always in the cheapest correct
//! representation: two plaintexts give a plaintext, anything else a ciphertext.
//!
//! Kernels are stateless. They validate their operands, call primitives of the
//! injected [Backend](crate::Backend) and write only the output slot. If anything
//! fails, the output slot is left exactly as it was.

use crate::{Ciphertext, ElementType, EncryptedValue, Error, Plaintext, Result, util};

mod add;
mod multiply;
mod subtract;
mod unary;

pub use add::*;
pub use multiply::*;
pub use subtract::*;
pub use unary::*;

/// Descriptors shared by both representations, as seen by kernel validation.
pub(crate) trait Operand {
    fn element_type(&self) -> ElementType;
    fn slot_count(&self) -> usize;
    fn is_allocated(&self) -> bool;
    fn scale(&self) -> f64;
}

impl Operand for Ciphertext {
    fn element_type(&self) -> ElementType { Ciphertext::element_type(self) }
    fn slot_count(&self) -> usize { Ciphertext::slot_count(self) }
    fn is_allocated(&self) -> bool { Ciphertext::is_allocated(self) }
    fn scale(&self) -> f64 { Ciphertext::scale(self) }
}

impl Operand for Plaintext {
    fn element_type(&self) -> ElementType { Plaintext::element_type(self) }
    fn slot_count(&self) -> usize { Plaintext::slot_count(self) }
    fn is_allocated(&self) -> bool { Plaintext::is_allocated(self) }
    fn scale(&self) -> f64 { Plaintext::scale(self) }
}

/// Both operands and the output slot must carry `element_type`, be allocated
/// and agree on the slot count.
pub(crate) fn check_binary<L, R, O>(left: &L, right: &R, out: &O, element_type: ElementType) -> Result<()>
where L: Operand, R: Operand, O: Operand
{
    if left.element_type() != element_type || right.element_type() != element_type {
        return Err(Error::ElementTypeMismatch {
            left: left.element_type(),
            right: right.element_type(),
            expected: element_type,
        });
    }
    if !left.is_allocated() || !right.is_allocated() {
        return Err(Error::OperandNotAllocated);
    }
    if left.slot_count() != right.slot_count() {
        return Err(Error::SlotCountMismatch(left.slot_count(), right.slot_count()));
    }
    check_output(out, element_type, left.slot_count())
}

pub(crate) fn check_unary<I, O>(input: &I, out: &O, element_type: ElementType) -> Result<()>
where I: Operand, O: Operand
{
    if input.element_type() != element_type {
        return Err(Error::ElementTypeMismatch {
            left: input.element_type(),
            right: input.element_type(),
            expected: element_type,
        });
    }
    if !input.is_allocated() {
        return Err(Error::OperandNotAllocated);
    }
    check_output(out, element_type, input.slot_count())
}

fn check_output<O: Operand>(out: &O, element_type: ElementType, slot_count: usize) -> Result<()> {
    if !out.is_allocated() {
        return Err(Error::OutputNotAllocated);
    }
    if out.element_type() != element_type {
        return Err(Error::ElementTypeMismatch {
            left: out.element_type(),
            right: out.element_type(),
            expected: element_type,
        });
    }
    if out.slot_count() != slot_count {
        return Err(Error::SlotCountMismatch(out.slot_count(), slot_count));
    }
    Ok(())
}

/// Additive operations need equal scales.
pub(crate) fn check_scale<L: Operand, R: Operand>(left: &L, right: &R) -> Result<()> {
    if !util::are_close_f64(left.scale(), right.scale()) {
        return Err(Error::ScaleMismatch(left.scale(), right.scale()));
    }
    Ok(())
}

/// Two ciphertexts must sit at the same modulus level.
pub(crate) fn check_level<B: crate::Backend>(left: &Ciphertext, right: &Ciphertext, backend: &B) -> Result<()> {
    if left.parms_id() != right.parms_id() {
        let context = backend.context();
        return Err(Error::ModulusLevelMismatch(
            context.chain_index(left.parms_id())?,
            context.chain_index(right.parms_id())?,
        ));
    }
    Ok(())
}

/// Runs `f` on a copy of `out` and only stores the copy on success.
pub(crate) fn staged<T, F>(out: &mut T, f: F) -> Result<()>
where T: Clone, F: FnOnce(&mut T) -> Result<()>
{
    let mut result = out.clone();
    f(&mut result)?;
    *out = result;
    Ok(())
}

pub(crate) fn output_kind_mismatch(left: &EncryptedValue, right: &EncryptedValue) -> Error {
    Error::OutputKindMismatch { expected: left.kind().combine(right.kind()).name() }
}
