use std::collections::HashMap;
use std::sync::Arc;

use crate::{EncryptionParameters, Error, ParmsID, Result, util};

/// Per-level data of the modulus switching chain.
#[derive(Debug)]
pub struct ContextData {
    parms: EncryptionParameters,
    chain_index: usize,
    next_parms_id: Option<ParmsID>,
}

impl ContextData {

    /// Returns the [ParmsID] of this level of [ContextData].
    pub fn parms_id(&self) -> &ParmsID {
        self.parms.parms_id()
    }

    /// [EncryptionParameters] associated with this level of [ContextData].
    pub fn parms(&self) -> &EncryptionParameters {
        &self.parms
    }

    /// The chain index of this level. The last level has index 0 and the key
    /// level has the highest index.
    pub fn chain_index(&self) -> usize {
        self.chain_index
    }

    /// Total bit count of the coefficient modulus at this level.
    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.parms.coeff_modulus_bits().iter().sum()
    }

    /// The [ParmsID] of the next (lower) level, if any.
    pub fn next_parms_id(&self) -> Option<&ParmsID> {
        self.next_parms_id.as_ref()
    }

}

/// Pointer to [ContextData].
pub type ContextDataPointer = Arc<ContextData>;

/// Holds the modulus switching chain derived from a set of [EncryptionParameters].
///
/// The first element of the chain is the key level, which holds all coefficient
/// moduli. When there is more than one modulus, the last one is reserved as the
/// special prime and the first ciphertext level drops it. Every following level
/// drops one more modulus, down to a single one. Each level is identified by its
/// [ParmsID], so ciphertexts can be checked for being at the same level before
/// they are combined.
///
/// The context also carries the ciphertext size bound of the scheme: fresh and
/// relinearized ciphertexts have [HeContext::ciphertext_size_bound] components,
/// and one ciphertext-ciphertext multiplication of such values yields
/// [HeContext::multiplied_ciphertext_size].
#[derive(Debug)]
pub struct HeContext {
    key_parms_id: ParmsID,
    first_parms_id: ParmsID,
    last_parms_id: ParmsID,
    context_data_map: HashMap<ParmsID, ContextDataPointer>,
}

impl HeContext {

    /// Create [HeContext] with the given parameters.
    pub fn new(parms: EncryptionParameters) -> Result<Arc<Self>> {
        parms.validate()?;

        let moduli_count = parms.coeff_modulus_bits().len();
        // Levels from the key level downwards, each dropping one more modulus.
        let mut levels = vec![parms.clone()];
        for drop in 1..moduli_count {
            levels.push(parms.drop_last_moduli(drop));
        }

        let key_parms_id = *levels[0].parms_id();
        let first_parms_id = *levels[if moduli_count > 1 {1} else {0}].parms_id();
        let last_parms_id = *levels[levels.len() - 1].parms_id();

        let level_count = levels.len();
        let mut context_data_map = HashMap::with_capacity(level_count);
        for (i, level) in levels.iter().enumerate() {
            let next_parms_id = levels.get(i + 1).map(|next| *next.parms_id());
            let context_data = ContextData {
                parms: level.clone(),
                chain_index: level_count - 1 - i,
                next_parms_id,
            };
            context_data_map.insert(*level.parms_id(), Arc::new(context_data));
        }

        Ok(Arc::new(HeContext {
            key_parms_id,
            first_parms_id,
            last_parms_id,
            context_data_map,
        }))
    }

    /// Get the [ParmsID] of the key level.
    pub fn key_parms_id(&self) -> &ParmsID {
        &self.key_parms_id
    }

    /// Get the [ParmsID] of the first ciphertext level.
    pub fn first_parms_id(&self) -> &ParmsID {
        &self.first_parms_id
    }

    /// Get the [ParmsID] of the last ciphertext level.
    pub fn last_parms_id(&self) -> &ParmsID {
        &self.last_parms_id
    }

    /// Get the [ContextData] pointer of the specified [ParmsID].
    pub fn get_context_data(&self, parms_id: &ParmsID) -> Option<ContextDataPointer> {
        let obtained = self.context_data_map.get(parms_id)?;
        Some(obtained.clone())
    }

    /// Like [HeContext::get_context_data], but reports an unknown id as an error.
    pub fn context_data(&self, parms_id: &ParmsID) -> Result<ContextDataPointer> {
        self.get_context_data(parms_id).ok_or(Error::InvalidParmsId)
    }

    /// Get the [ContextData] of the first ciphertext level.
    pub fn first_context_data(&self) -> Result<ContextDataPointer> {
        self.context_data(&self.first_parms_id)
    }

    /// Chain index of the level identified by `parms_id`.
    pub fn chain_index(&self, parms_id: &ParmsID) -> Result<usize> {
        Ok(self.context_data(parms_id)?.chain_index())
    }

    /// Number of slots in one value.
    pub fn slot_count(&self) -> usize {
        self.first_context_data()
            .map(|data| data.parms().poly_modulus_degree())
            .unwrap_or(0)
    }

    /// Size of a fresh or relinearized ciphertext; the largest size that may be
    /// fed into a ciphertext-ciphertext multiplication.
    pub fn ciphertext_size_bound(&self) -> usize {
        util::HE_CIPHERTEXT_SIZE_MIN
    }

    /// Size of the product of two ciphertexts of [HeContext::ciphertext_size_bound].
    pub fn multiplied_ciphertext_size(&self) -> usize {
        2 * self.ciphertext_size_bound() - 1
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemeType;

    #[test]
    fn test_modulus_chain() {
        let parms = EncryptionParameters::new(SchemeType::CKKS)
            .set_poly_modulus_degree(4096)
            .set_coeff_modulus_bits(&[40, 30, 30, 40]);
        let context = HeContext::new(parms.clone()).unwrap();
        assert_eq!(context.key_parms_id(), parms.parms_id());
        assert_ne!(context.key_parms_id(), context.first_parms_id());

        let key = context.context_data(context.key_parms_id()).unwrap();
        assert_eq!(key.chain_index(), 3);
        let first = context.first_context_data().unwrap();
        assert_eq!(first.chain_index(), 2);
        assert_eq!(first.parms().coeff_modulus_bits(), &[40, 30, 30]);
        assert_eq!(first.total_coeff_modulus_bit_count(), 100);

        // Walk the chain down to the last level
        let mut data = first;
        let mut steps = 0;
        while let Some(next) = data.next_parms_id() {
            data = context.context_data(next).unwrap();
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert_eq!(data.parms_id(), context.last_parms_id());
        assert_eq!(data.chain_index(), 0);
        assert_eq!(context.slot_count(), 4096);
        assert_eq!(context.ciphertext_size_bound(), 2);
        assert_eq!(context.multiplied_ciphertext_size(), 3);
    }

    #[test]
    fn test_single_modulus() {
        let parms = EncryptionParameters::new(SchemeType::BFV)
            .set_poly_modulus_degree(1024)
            .set_coeff_modulus_bits(&[50])
            .set_plain_modulus(65537);
        let context = HeContext::new(parms).unwrap();
        assert_eq!(context.key_parms_id(), context.first_parms_id());
        assert_eq!(context.first_parms_id(), context.last_parms_id());
        assert!(context.context_data(&crate::PARMS_ID_ZERO).is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        let parms = EncryptionParameters::new(SchemeType::CKKS).set_poly_modulus_degree(4096);
        assert!(matches!(HeContext::new(parms), Err(Error::InvalidParameters(_))));
    }
}
