use crate::{Backend, Ciphertext, ElementType, EncryptedValue, Plaintext, Result};

use super::{check_binary, check_level, check_scale, output_kind_mismatch, staged};

/// Ciphertext + ciphertext.
///
/// Both operands must be at the same modulus level, otherwise this fails with
/// [Error::ModulusLevelMismatch](crate::Error::ModulusLevelMismatch). Levels are
/// never aligned implicitly.
pub fn add_cipher_cipher<B: Backend>(
    left: &Ciphertext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_level(left, right, backend)?;
    check_scale(left, right)?;
    staged(out, |out| backend.add(left, right, out))
}

/// Ciphertext + plaintext.
pub fn add_cipher_plain<B: Backend>(
    left: &Ciphertext,
    right: &Plaintext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| backend.add_plain(left, right, out))
}

/// Plaintext + ciphertext. Same as [add_cipher_plain] with the operands swapped.
pub fn add_plain_cipher<B: Backend>(
    left: &Plaintext,
    right: &Ciphertext,
    out: &mut Ciphertext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| backend.add_plain(right, left, out))
}

/// Plaintext + plaintext, computed in the encoding domain without touching
/// any encryption primitive.
pub fn add_plain_plain<B: Backend>(
    left: &Plaintext,
    right: &Plaintext,
    out: &mut Plaintext,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    check_binary(left, right, out, element_type)?;
    check_scale(left, right)?;
    staged(out, |out| backend.plain_add(left, right, out))
}

/// Adds two values of any representation.
///
/// The output slot must already be allocated with the representation of the
/// result: a plaintext when both operands are plaintexts, a ciphertext
/// otherwise. A slot of the other kind fails with
/// [Error::OutputKindMismatch](crate::Error::OutputKindMismatch).
pub fn add<B: Backend>(
    left: &EncryptedValue,
    right: &EncryptedValue,
    out: &mut EncryptedValue,
    element_type: ElementType,
    backend: &B,
) -> Result<()> {
    tracing::trace!(left = left.kind().name(), right = right.kind().name(), %element_type, "add");
    match (left, right, out) {
        (EncryptedValue::Cipher(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            add_cipher_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Cipher(l), EncryptedValue::Plain(r), EncryptedValue::Cipher(o)) =>
            add_cipher_plain(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Cipher(r), EncryptedValue::Cipher(o)) =>
            add_plain_cipher(l, r, o, element_type, backend),
        (EncryptedValue::Plain(l), EncryptedValue::Plain(r), EncryptedValue::Plain(o)) =>
            add_plain_plain(l, r, o, element_type, backend),
        (l, r, _) => Err(output_kind_mismatch(l, r)),
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::testing::CountingBackend;
    use crate::kernel::test_util::Fixture;
    use crate::{Error, ErrorKind, TransparentEvaluator, ValueKind};

    use super::*;

    const KINDS: [(ValueKind, ValueKind); 4] = [
        (ValueKind::Cipher, ValueKind::Cipher),
        (ValueKind::Cipher, ValueKind::Plain),
        (ValueKind::Plain, ValueKind::Cipher),
        (ValueKind::Plain, ValueKind::Plain),
    ];

    #[test]
    fn test_add_commutative() {
        let fx = Fixture::new();
        let a = [1.0, 0.0, 3.0, 7.0];
        let b = [2.0, 1.0, 5.0, 0.0];
        for element_type in ElementType::ALL {
            for (kl, kr) in KINDS {
                let x = fx.value(kl, &a, element_type);
                let y = fx.value(kr, &b, element_type);
                let out_kind = kl.combine(kr);
                let mut xy = fx.slot(out_kind, element_type, 4);
                let mut yx = fx.slot(out_kind, element_type, 4);
                add(&x, &y, &mut xy, element_type, &fx.evaluator).unwrap();
                add(&y, &x, &mut yx, element_type, &fx.evaluator).unwrap();
                assert_eq!(xy.kind(), out_kind);
                assert_eq!(fx.reveal(&xy), fx.reveal(&yx), "{element_type} {kl:?} {kr:?}");
                if element_type != ElementType::Boolean {
                    assert_eq!(fx.reveal(&xy), vec![3.0, 1.0, 8.0, 7.0]);
                }
            }
        }
    }

    #[test]
    fn test_mixed_entries_agree() {
        let fx = Fixture::new();
        let ty = ElementType::F32;
        let c = fx.value(ValueKind::Cipher, &[1.5, -2.25], ty);
        let p = fx.value(ValueKind::Plain, &[0.5, 4.0], ty);
        let (c, p) = (c.as_cipher().unwrap(), p.as_plain().unwrap());
        let mut cp = Ciphertext::allocate(&fx.context, ty, 2);
        let mut pc = Ciphertext::allocate(&fx.context, ty, 2);
        add_cipher_plain(c, p, &mut cp, ty, &fx.evaluator).unwrap();
        add_plain_cipher(p, c, &mut pc, ty, &fx.evaluator).unwrap();
        assert_eq!(cp, pc);
        assert_eq!(fx.reveal(&EncryptedValue::Cipher(cp)), vec![2.0, 1.75]);
    }

    #[test]
    fn test_plain_plain_stays_in_encoding_domain() {
        let fx = Fixture::new();
        let ty = ElementType::I64;
        let x = fx.value(ValueKind::Plain, &[3.0, -4.0], ty);
        let y = fx.value(ValueKind::Plain, &[10.0, 1.0], ty);
        let counting = CountingBackend::new(TransparentEvaluator::new(fx.context.clone()));
        let mut out = fx.slot(ValueKind::Plain, ty, 2);
        add(&x, &y, &mut out, ty, &counting).unwrap();
        assert_eq!(counting.encrypted_calls(), 0);
        assert_eq!(counting.plain_calls(), 1);
        assert_eq!(fx.reveal(&out), vec![13.0, -3.0]);
    }

    #[test]
    fn test_type_mismatch_leaves_output_untouched() {
        let fx = Fixture::new();
        let x = fx.value(ValueKind::Cipher, &[1.0, 2.0], ElementType::F32);
        let y = fx.value(ValueKind::Cipher, &[1.0, 2.0], ElementType::I32);
        let mut out = fx.slot(ValueKind::Cipher, ElementType::F32, 2);
        let before = out.clone();
        let counting = CountingBackend::new(TransparentEvaluator::new(fx.context.clone()));
        let result = add(&x, &y, &mut out, ElementType::F32, &counting);
        assert_eq!(result, Err(Error::ElementTypeMismatch {
            left: ElementType::F32,
            right: ElementType::I32,
            expected: ElementType::F32,
        }));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Precondition);
        assert_eq!(out, before);
        assert_eq!(counting.encrypted_calls(), 0);
    }

    #[test]
    fn test_level_mismatch() {
        let fx = Fixture::new();
        let ty = ElementType::F64;
        let x = fx.value(ValueKind::Cipher, &[1.0], ty);
        let y = fx.value(ValueKind::Cipher, &[2.0], ty);
        let mut lowered = Ciphertext::allocate(&fx.context, ty, 1);
        fx.evaluator.mod_switch_to_next(y.as_cipher().unwrap(), &mut lowered).unwrap();
        let mut out = fx.slot(ValueKind::Cipher, ty, 1);
        let before = out.clone();
        let err = add(&x, &EncryptedValue::Cipher(lowered), &mut out, ty, &fx.evaluator).unwrap_err();
        assert_eq!(err, Error::ModulusLevelMismatch(1, 0));
        assert_eq!(err.kind(), ErrorKind::SchemeMismatch);
        assert_eq!(out, before);
    }

    #[test]
    fn test_output_slot_checks() {
        let fx = Fixture::new();
        let ty = ElementType::I32;
        let x = fx.value(ValueKind::Plain, &[1.0, 2.0], ty);
        let c = fx.value(ValueKind::Cipher, &[1.0, 2.0], ty);

        let mut wrong_kind = fx.slot(ValueKind::Cipher, ty, 2);
        assert_eq!(
            add(&x, &x, &mut wrong_kind, ty, &fx.evaluator),
            Err(Error::OutputKindMismatch { expected: "plaintext" })
        );
        let mut wrong_kind = fx.slot(ValueKind::Plain, ty, 2);
        assert_eq!(
            add(&x, &c, &mut wrong_kind, ty, &fx.evaluator),
            Err(Error::OutputKindMismatch { expected: "ciphertext" })
        );

        let mut unallocated = EncryptedValue::Cipher(Ciphertext::new(ty));
        assert_eq!(add(&c, &c, &mut unallocated, ty, &fx.evaluator), Err(Error::OutputNotAllocated));
        let mut short = fx.slot(ValueKind::Cipher, ty, 1);
        assert_eq!(add(&c, &c, &mut short, ty, &fx.evaluator), Err(Error::SlotCountMismatch(1, 2)));
    }

    #[test]
    fn test_concurrent_dispatch() {
        let fx = Fixture::new();
        let ty = ElementType::I64;
        let inputs: Vec<_> = (0..8)
            .map(|i| fx.value(ValueKind::Cipher, &[i as f64, 1.0], ty))
            .collect();
        let mut outputs: Vec<_> = (0..8).map(|_| fx.slot(ValueKind::Cipher, ty, 2)).collect();
        let evaluator = &fx.evaluator;
        std::thread::scope(|s| {
            for (i, out) in outputs.iter_mut().enumerate() {
                let (x, y) = (&inputs[i], &inputs[7 - i]);
                s.spawn(move || add(x, y, out, ty, evaluator).unwrap());
            }
        });
        for out in &outputs {
            assert_eq!(fx.reveal(out), vec![7.0, 2.0]);
        }
    }
}
