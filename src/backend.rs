use std::sync::Arc;

use crate::{Ciphertext, HeContext, Plaintext, Result};

/// The evaluation context injected into the kernels.
///
/// A backend supplies the primitive homomorphic operations and the scheme
/// parameters (through [Backend::context]). Kernels select and schedule these
/// primitives but never implement them, so an alternate scheme backend can be
/// substituted without touching the dispatch layer.
///
/// The primitives come in two groups. The *encryption primitives* operate on
/// ciphertexts and may consume noise budget. The *encoding-domain primitives*
/// (`plain_*`) combine two plaintexts without touching any encryption
/// machinery; they are the cheap path taken whenever no operand is encrypted.
///
/// Every primitive writes only to `destination` and never mutates its inputs.
/// Implementations are shared between threads; a backend that mutates internal
/// state during evaluation must synchronize it itself.
pub trait Backend: Send + Sync {

    /// The scheme parameters and modulus switching chain.
    fn context(&self) -> &Arc<HeContext>;

    /// Ciphertext-ciphertext addition.
    fn add(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext-plaintext addition.
    fn add_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext-ciphertext subtraction.
    fn sub(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext-plaintext subtraction.
    fn sub_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext-ciphertext multiplication. The output size is the sum of the
    /// input sizes minus one.
    fn multiply(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext-plaintext multiplication. The size is preserved.
    fn multiply_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()>;

    /// Ciphertext negation.
    fn negate(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Reduce the ciphertext back to [HeContext::ciphertext_size_bound] components.
    fn relinearize(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Move the ciphertext to the next level of the modulus switching chain.
    fn mod_switch_to_next(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()>;

    /// Plaintext-plaintext addition in the encoding domain.
    fn plain_add(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()>;

    /// Plaintext-plaintext subtraction in the encoding domain.
    fn plain_sub(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()>;

    /// Plaintext-plaintext multiplication in the encoding domain.
    fn plain_multiply(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()>;

    /// Plaintext negation in the encoding domain.
    fn plain_negate(&self, plain: &Plaintext, destination: &mut Plaintext) -> Result<()>;
}
