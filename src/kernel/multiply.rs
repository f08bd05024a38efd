use crate::{Backend, Ciphertext, ElementType, EncryptedValue, Plaintext, Result};

use super::{check_binary, check_level, output_kind_mismatch, staged};

/// Ciphertext * ciphertext.
///
/// This is the only size-increasing kernel: operands of sizes K and L produce
/// a ciphertext of size K+L-1, which must be relinearized before it takes part
/// in another ciphertext multiplication. The backend refuses operands above
/// its size bound with [Error::CiphertextSizeExceeded](crate::Error::CiphertextSizeExceeded).
pub fn multiply_cipher_cipher<B: Backend>(
    left: &Ciphertext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_level(left, right, backend)?;
    staged(out, |out| backend.multiply(left, right, out))
}

/// Ciphertext * plaintext. The ciphertext size is preserved.
pub fn multiply_cipher_plain<B: Backend>(
    left: &Ciphertext,
    right: &Plaintext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    staged(out, |out| backend.multiply_plain(left, right, out))
}

pub fn multiply_plain_cipher<B: Backend>(
    left: &Plaintext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    staged(out, |out| backend.multiply_plain(right, left, out))
}

pub fn multiply_plain_plain<B: Backend>(
    left: &Plaintext,
    right: &Plaintext,
    out: &mut Plaintext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    staged(out, |out| backend.plain_multiply(left, right, out))
}

/// Multiplies two values of any representation.
pub fn multiply<B: Backend>(
    left: &EncryptedValue,
    right: &EncryptedValue,
    out: &mut EncryptedValue,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    tracing::trace!(left = left.kind().name(), right = right.kind().name(), %element_type, "multiply");
    match (left, right, out) {
        (EncryptedValue::Cipher(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            multiply_cipher_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Cipher(l), EncryptedValue::Plain(r), EncryptedValue::Cipher(o)) =>
            multiply_cipher_plain(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            multiply_plain_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Plain(r), EncryptedValue::Plain(o)) =>
            multiply_plain_plain(l, r, o, element_type, backend),
        (l, r, _) => Err(output_kind_mismatch(l, r)),
    }
}
