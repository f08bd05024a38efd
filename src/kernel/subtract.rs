use crate::{Backend, Ciphertext, ElementType, EncryptedValue, Plaintext, Result};

use super::{check_binary, check_level, check_scale, output_kind_mismatch, staged};

/// Ciphertext - ciphertext. Levels must match.
pub fn subtract_cipher_cipher<B: Backend>(
    left: &Ciphertext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_level(left, right, backend)?;
    check_scale(left, right)?;
    staged(out, |out| backend.sub(left, right, out))
}

pub fn subtract_cipher_plain<B: Backend>(
    left: &Ciphertext,
    right: &Plaintext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| backend.sub_plain(left, right, out))
}

/// Plaintext - ciphertext, computed as `-right + left`.
pub fn subtract_plain_cipher<B: Backend>(
    left: &Plaintext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| {
        let mut negated = out.clone();
        backend.negate(right, &mut negated)?;
        backend.add_plain(&negated, left, out)
    })
}

pub fn subtract_plain_plain<B: Backend>(
    left: &Plaintext,
    right: &Plaintext,
    out: &mut Plaintext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| backend.plain_sub(left, right, out))
}

/// Subtracts two values of any representation. See [add](super::add) for the
/// output slot rules.
pub fn subtract<B: Backend>(
    left: &EncryptedValue,
    right: &EncryptedValue,
    out: &mut EncryptedValue,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    tracing::trace!(left = left.kind().name(), right = right.kind().name(), %element_type, "subtract");
    match (left, right, out) {
        (EncryptedValue::Cipher(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            subtract_cipher_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Cipher(l), EncryptedValue::Plain(r), EncryptedValue::Cipher(o)) =>
            subtract_cipher_plain(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            subtract_plain_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Plain(r), EncryptedValue::Plain(o)) =>
            subtract_plain_plain(l, r, o, element_type, backend),
        (l, r, _) => Err(output_kind_mismatch(l, r)),
    }
}
