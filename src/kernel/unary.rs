use crate::{Backend, Ciphertext, ElementType, EncryptedValue, Error, Plaintext, Result};

use super::{check_unary, staged};

pub fn negate_cipher<B: Backend>(input: &Ciphertext, out: &mut Ciphertext, element_type: ElementType, backend: &B) -> Result<()> {
    check_unary(input, out, element_type)?;
    staged(out, |out| backend.negate(input, out))
}

pub fn negate_plain<B: Backend>(input: &Plaintext, out: &mut Plaintext, element_type: ElementType, backend: &B) -> Result<()> {
    check_unary(input, out, element_type)?;
    staged(out, |out| backend.plain_negate(input, out))
}

/// Negates a value, keeping its representation.
pub fn negate<B: Backend>(input: &EncryptedValue, out: &mut EncryptedValue, element_type: ElementType, backend: &B) -> Result<()> {
    tracing::trace!(input = input.kind().name(), %element_type, "negate");
    match (input, out) {
        (EncryptedValue::Cipher(i), EncryptedValue::Cipher(o)) => negate_cipher(i, o, element_type, backend),
        (EncryptedValue::Plain(i), EncryptedValue::Plain(o)) => negate_plain(i, o, element_type, backend),
        (i, _) => Err(Error::OutputKindMismatch { expected: i.kind().name() }),
    }
}

/// Brings a ciphertext back to the size bound of the scheme. A ciphertext that
/// is already within the bound is copied unchanged.
pub fn relinearize_cipher<B: Backend>(input: &Ciphertext, out: &mut Ciphertext, element_type: ElementType, backend: &B) -> Result<()> {
    check_unary(input, out, element_type)?;
    staged(out, |out| backend.relinearize(input, out))
}

/// Plaintexts never grow, so this is a copy.
pub fn relinearize_plain(input: &Plaintext, out: &mut Plaintext, element_type: ElementType) -> Result<()> {
    check_unary(input, out, element_type)?;
    out.clone_from(input);
    Ok(())
}

/// Relinearizes a value of any representation.
pub fn relinearize<B: Backend>(input: &EncryptedValue, out: &mut EncryptedValue, element_type: ElementType, backend: &B) -> Result<()> {
    tracing::trace!(input = input.kind().name(), %element_type, "relinearize");
    match (input, out) {
        (EncryptedValue::Cipher(i), EncryptedValue::Cipher(o)) => relinearize_cipher(i, o, element_type, backend),
        (EncryptedValue::Plain(i), EncryptedValue::Plain(o)) => relinearize_plain(i, o, element_type),
        (i, _) => Err(Error::OutputKindMismatch { expected: i.kind().name() }),
    }
}

#[cfg(test)]
mod tests {
    use crate::kernel::{multiply, test_util::Fixture};
    use crate::ValueKind;

    use super::*;

    #[test]
    fn test_negate() {
        let fx = Fixture::new();
        let ty = ElementType::F32;
        for kind in [ValueKind::Cipher, ValueKind::Plain] {
            let x = fx.value(kind, &[1.5, -3.0], ty);
            let mut out = fx.slot(kind, ty, 2);
            negate(&x, &mut out, ty, &fx.evaluator).unwrap();
            assert_eq!(fx.reveal(&out), vec![-1.5, 3.0]);
        }
        let x = fx.value(ValueKind::Plain, &[1.0], ty);
        let mut out = fx.slot(ValueKind::Cipher, ty, 1);
        assert_eq!(
            negate(&x, &mut out, ty, &fx.evaluator),
            Err(Error::OutputKindMismatch { expected: "plaintext" })
        );
    }

    #[test]
    fn test_relinearize() {
        let fx = Fixture::new();
        let ty = ElementType::I64;
        let c = fx.value(ValueKind::Cipher, &[6.0, -7.0], ty);
        let mut squared = fx.slot(ValueKind::Cipher, ty, 2);
        multiply(&c, &c, &mut squared, ty, &fx.evaluator).unwrap();

        let mut out = fx.slot(ValueKind::Cipher, ty, 2);
        relinearize(&squared, &mut out, ty, &fx.evaluator).unwrap();
        assert_eq!(out.as_cipher().unwrap().size(), 2);
        assert_eq!(fx.reveal(&out), vec![36.0, 49.0]);

        // Already within the bound: unchanged
        let mut copy = fx.slot(ValueKind::Cipher, ty, 2);
        relinearize(&c, &mut copy, ty, &fx.evaluator).unwrap();
        assert_eq!(copy, c);

        let p = fx.value(ValueKind::Plain, &[1.0, 2.0], ty);
        let mut plain_out = fx.slot(ValueKind::Plain, ty, 2);
        relinearize(&p, &mut plain_out, ty, &fx.evaluator).unwrap();
        assert_eq!(plain_out, p);
    }
}
