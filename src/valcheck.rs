use crate::{Ciphertext, HeContext, Plaintext, util};

/// Provide methods for checking the validity of an HE objects
pub trait ValCheck {
    /// Check whether the metadata is valid.
    fn is_metadata_valid_for(&self, context: &HeContext) -> bool;
    /// Check whether the buffer is valid.
    fn is_buffer_valid(&self) -> bool;
    /// Check whether the object is valid.
    /// Shortcut for [ValCheck::is_metadata_valid_for] plus [ValCheck::is_buffer_valid].
    fn is_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context) && self.is_buffer_valid()
    }
}

impl ValCheck for Plaintext {

    fn is_buffer_valid(&self) -> bool {
        self.data().len() == self.slot_count()
    }

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        self.is_allocated() && self.slot_count() <= context.slot_count() && self.scale() > 0.0
    }

}

impl ValCheck for Ciphertext {

    fn is_buffer_valid(&self) -> bool {
        self.data().len() == self.size() * self.slot_count()
    }

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        if !self.is_allocated() {return false;}
        if context.get_context_data(self.parms_id()).is_none() {return false;}
        if self.size() > util::HE_CIPHERTEXT_SIZE_MAX {return false;}
        self.slot_count() <= context.slot_count() && self.scale() > 0.0
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementType, EncryptionParameters, SchemeType, PARMS_ID_ZERO};

    #[test]
    fn test_valcheck() {
        let parms = EncryptionParameters::new(SchemeType::CKKS)
            .set_poly_modulus_degree(64)
            .set_coeff_modulus_bits(&[40, 40]);
        let context = HeContext::new(parms).unwrap();

        let mut cipher = Ciphertext::allocate(&context, ElementType::F64, 64);
        assert!(cipher.is_valid_for(&context));
        cipher.set_parms_id(PARMS_ID_ZERO);
        assert!(!cipher.is_valid_for(&context));
        assert!(!Ciphertext::allocate(&context, ElementType::F64, 65).is_valid_for(&context));
        assert!(!Ciphertext::new(ElementType::F64).is_valid_for(&context));

        assert!(Plaintext::allocate(ElementType::I32, 4).is_valid_for(&context));
        assert!(!Plaintext::new(ElementType::I32).is_valid_for(&context));
    }
}
