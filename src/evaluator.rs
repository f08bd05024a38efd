use std::sync::Arc;

use rand::Rng;

use crate::{
    util, Backend, Ciphertext, ElementType, Error, HeContext, ParmsID, Plaintext, Result, ValCheck,
};

/// Bits in one simulated coefficient word.
const WORD_BIT_COUNT: usize = 64;

/// How the [TransparentEvaluator] charges noise budget, in bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NoiseModel {
    /// Budget of a freshly encrypted ciphertext.
    pub fresh_budget: u32,
    /// Cost of a ciphertext-ciphertext multiplication.
    pub multiply_cost: u32,
    /// Cost of a ciphertext-plaintext multiplication.
    pub multiply_plain_cost: u32,
    /// Cost of one relinearization.
    pub relinearize_cost: u32,
}

impl Default for NoiseModel {
    fn default() -> Self {
        NoiseModel {
            fresh_budget: 120,
            multiply_cost: 20,
            multiply_plain_cost: 10,
            relinearize_cost: 2,
        }
    }
}

/// Reference [Backend] that simulates the observable behaviour of an RLWE scheme
/// without any security.
///
/// Values are encoded in fixed point (real element types at scale
/// `2^scale_bits`, integer types at scale 1) and stored as two's complement
/// words. A ciphertext of size K holds K components whose wrapping sum is the
/// message, i.e. decryption under the secret `s = 1`. This keeps every
/// structural property the kernels and the relinearization pass care about:
/// - multiplication convolves the components, so sizes K and L give K+L-1;
/// - relinearization folds the extra components back, so the size returns to 2
///   while the message is unchanged;
/// - ciphertexts carry their level, scale and a shrinking noise budget.
///
/// Like CKKS, the evaluator refuses to multiply a ciphertext above the size bound,
/// and refuses any product whose scale no longer fits the modulus of its level
/// or the 64-bit word.
///
/// # Example
/// ```rust
/// use hexec::*;
/// let parms = EncryptionParameters::new(SchemeType::CKKS)
///     .set_poly_modulus_degree(8)
///     .set_coeff_modulus_bits(&[40, 30, 40]);
/// let evaluator = TransparentEvaluator::new(HeContext::new(parms).unwrap());
/// let mut rng = rand::thread_rng();
/// let plain = evaluator.encode(&[1.5, -2.0], ElementType::F32);
/// let cipher = evaluator.encrypt(&plain, &mut rng).unwrap();
/// let mut sum = cipher.clone();
/// evaluator.add(&cipher, &cipher, &mut sum).unwrap();
/// let decoded = evaluator.decode(&evaluator.decrypt(&sum).unwrap());
/// assert_eq!(decoded, vec![3.0, -4.0]);
/// ```
pub struct TransparentEvaluator {
    context: Arc<HeContext>,
    noise: NoiseModel,
}

impl TransparentEvaluator {

    /// Create an evaluator with the specified [HeContext] and the default [NoiseModel].
    pub fn new(context: Arc<HeContext>) -> Self {
        Self { context, noise: NoiseModel::default() }
    }

    /// Replace the [NoiseModel].
    pub fn with_noise_model(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    /// The [NoiseModel] in use.
    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise
    }

    /// Fixed-point scale of freshly encoded values of the given type.
    pub fn scale_for(&self, element_type: ElementType) -> f64 {
        if element_type.is_real() {
            let bits = self.context.first_context_data()
                .map(|data| data.parms().scale_bits())
                .unwrap_or(0);
            (1u64 << bits) as f64
        } else {
            1.0
        }
    }

    /// Encode values into a plaintext.
    pub fn encode(&self, values: &[f64], element_type: ElementType) -> Plaintext {
        let scale = self.scale_for(element_type);
        let data = values.iter()
            .map(|&v| match element_type {
                ElementType::Boolean => (v != 0.0) as u64,
                _ if element_type.is_signed() => (v * scale).round() as i64 as u64,
                _ => (v * scale).round() as u64,
            })
            .collect();
        Plaintext::from_members(element_type, data, scale)
    }

    /// Decode a plaintext back into values.
    pub fn decode(&self, plain: &Plaintext) -> Vec<f64> {
        let signed = plain.element_type().is_signed();
        plain.data().iter()
            .map(|&w| if signed {w as i64 as f64} else {w as f64})
            .map(|w| w / plain.scale())
            .collect()
    }

    /// Encrypt a plaintext at the first level of the chain.
    pub fn encrypt<R: Rng>(&self, plain: &Plaintext, rng: &mut R) -> Result<Ciphertext> {
        self.check_plaintext(plain)?;
        let mut destination = Ciphertext::allocate(&self.context, plain.element_type(), plain.slot_count());
        let mask: Vec<u64> = (0..plain.slot_count()).map(|_| rng.gen()).collect();
        destination.poly_mut(0).iter_mut()
            .zip(plain.data().iter().zip(mask.iter()))
            .for_each(|(c, (&m, &r))| *c = m.wrapping_sub(r));
        destination.poly_mut(1).copy_from_slice(&mask);
        destination.set_scale(plain.scale());
        destination.set_noise_budget(self.noise.fresh_budget);
        Ok(destination)
    }

    /// Decrypt a ciphertext of any size.
    pub fn decrypt(&self, encrypted: &Ciphertext) -> Result<Plaintext> {
        self.check_ciphertext(encrypted)?;
        let mut data = vec![0u64; encrypted.slot_count()];
        for i in 0..encrypted.size() {
            data.iter_mut()
                .zip(encrypted.poly(i))
                .for_each(|(d, &c)| *d = d.wrapping_add(c));
        }
        Ok(Plaintext::from_members(encrypted.element_type(), data, encrypted.scale()))
    }

    fn check_ciphertext(&self, ciphertext: &Ciphertext) -> Result<()> {
        if !ciphertext.is_allocated() || !ciphertext.is_buffer_valid() {
            return Err(Error::OperandNotAllocated);
        }
        if !ciphertext.is_valid_for(&self.context) {
            return Err(Error::InvalidParmsId);
        }
        Ok(())
    }

    fn check_plaintext(&self, plaintext: &Plaintext) -> Result<()> {
        if !plaintext.is_valid_for(&self.context) {
            return Err(Error::OperandNotAllocated);
        }
        Ok(())
    }

    fn match_parms_id(&self, ciphertext1: &Ciphertext, ciphertext2: &Ciphertext) -> Result<()> {
        if ciphertext1.parms_id() != ciphertext2.parms_id() {
            return Err(Error::ModulusLevelMismatch(
                self.context.chain_index(ciphertext1.parms_id())?,
                self.context.chain_index(ciphertext2.parms_id())?,
            ));
        }
        Ok(())
    }

    fn match_scale(scale1: f64, scale2: f64) -> Result<()> {
        if !util::are_close_f64(scale1, scale2) {
            return Err(Error::ScaleMismatch(scale1, scale2));
        }
        Ok(())
    }

    fn check_size_bound(&self, ciphertext: &Ciphertext) -> Result<()> {
        let bound = self.context.ciphertext_size_bound();
        if ciphertext.size() > bound {
            return Err(Error::CiphertextSizeExceeded { size: ciphertext.size(), bound });
        }
        Ok(())
    }

    /// The scale must be positive and stay below the bit count of the level's
    /// coefficient modulus, capped by the word size. Plaintexts have no level.
    fn check_scale_bound(&self, scale: f64, parms_id: Option<&ParmsID>) -> Result<()> {
        let bound = match parms_id {
            Some(parms_id) => self.context.context_data(parms_id)?
                .total_coeff_modulus_bit_count()
                .min(WORD_BIT_COUNT),
            None => WORD_BIT_COUNT,
        };
        if scale <= 0.0 || scale.log2() as usize >= bound {
            return Err(Error::ScaleOutOfBounds { scale, bound });
        }
        Ok(())
    }

    fn consume_noise(&self, destination: &mut Ciphertext, cost: u32) {
        let budget = destination.noise_budget().saturating_sub(cost);
        if budget == 0 {
            tracing::warn!("Noise budget exhausted, result will not decrypt correctly");
        }
        destination.set_noise_budget(budget);
    }

    fn add_sub_inplace(&self, destination: &mut Ciphertext, operand: &Ciphertext, negate: bool) -> Result<()> {
        let size1 = destination.size();
        let size2 = operand.size();
        let max_count = size1.max(size2);
        let parms_id = *destination.parms_id();
        destination.resize(&self.context, &parms_id, max_count)?;
        for i in 0..size2 {
            destination.poly_mut(i).iter_mut()
                .zip(operand.poly(i))
                .for_each(|(d, &o)| {
                    *d = if negate {d.wrapping_sub(o)} else {d.wrapping_add(o)};
                });
        }
        destination.set_noise_budget(destination.noise_budget().min(operand.noise_budget()));
        Ok(())
    }

    fn binary_checks(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted1)?;
        self.check_ciphertext(encrypted2)?;
        self.match_parms_id(encrypted1, encrypted2)
    }

    fn plain_checks(&self, encrypted: &Ciphertext, plain: &Plaintext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        self.check_plaintext(plain)
    }

    fn plain_slotwise<F>(plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext, op: F)
    where F: Fn(u64, u64) -> u64
    {
        destination.clone_from(plain1);
        destination.data_mut().iter_mut()
            .zip(plain2.data())
            .for_each(|(d, &b)| *d = op(*d, b));
    }

}

impl Backend for TransparentEvaluator {

    fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    fn add(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.binary_checks(encrypted1, encrypted2)?;
        Self::match_scale(encrypted1.scale(), encrypted2.scale())?;
        destination.clone_from(encrypted1);
        self.add_sub_inplace(destination, encrypted2, false)
    }

    fn add_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()> {
        self.plain_checks(encrypted, plain)?;
        Self::match_scale(encrypted.scale(), plain.scale())?;
        destination.clone_from(encrypted);
        destination.poly_mut(0).iter_mut()
            .zip(plain.data())
            .for_each(|(d, &p)| *d = d.wrapping_add(p));
        Ok(())
    }

    fn sub(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.binary_checks(encrypted1, encrypted2)?;
        Self::match_scale(encrypted1.scale(), encrypted2.scale())?;
        destination.clone_from(encrypted1);
        self.add_sub_inplace(destination, encrypted2, true)
    }

    fn sub_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()> {
        self.plain_checks(encrypted, plain)?;
        Self::match_scale(encrypted.scale(), plain.scale())?;
        destination.clone_from(encrypted);
        destination.poly_mut(0).iter_mut()
            .zip(plain.data())
            .for_each(|(d, &p)| *d = d.wrapping_sub(p));
        Ok(())
    }

    fn multiply(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.binary_checks(encrypted1, encrypted2)?;
        self.check_size_bound(encrypted1)?;
        self.check_size_bound(encrypted2)?;
        let scale = encrypted1.scale() * encrypted2.scale();
        self.check_scale_bound(scale, Some(encrypted1.parms_id()))?;
        let size1 = encrypted1.size();
        let size2 = encrypted2.size();
        let dest_size = size1 + size2 - 1;
        let slot_count = encrypted1.slot_count();

        // c_k = sum_{i + j = k} a_i * b_j
        let mut product = vec![0u64; dest_size * slot_count];
        for i in 0..size1 {
            for j in 0..size2 {
                let target = &mut product[(i + j) * slot_count..(i + j + 1) * slot_count];
                target.iter_mut()
                    .zip(encrypted1.poly(i).iter().zip(encrypted2.poly(j)))
                    .for_each(|(t, (&a, &b))| *t = t.wrapping_add(a.wrapping_mul(b)));
            }
        }

        destination.clone_from(encrypted1);
        destination.resize(&self.context, encrypted1.parms_id(), dest_size)?;
        destination.data_mut().copy_from_slice(&product);
        destination.set_scale(scale);
        destination.set_noise_budget(encrypted1.noise_budget().min(encrypted2.noise_budget()));
        self.consume_noise(destination, self.noise.multiply_cost);
        Ok(())
    }

    fn multiply_plain(&self, encrypted: &Ciphertext, plain: &Plaintext, destination: &mut Ciphertext) -> Result<()> {
        self.plain_checks(encrypted, plain)?;
        let scale = encrypted.scale() * plain.scale();
        self.check_scale_bound(scale, Some(encrypted.parms_id()))?;
        destination.clone_from(encrypted);
        for i in 0..destination.size() {
            destination.poly_mut(i).iter_mut()
                .zip(plain.data())
                .for_each(|(d, &p)| *d = d.wrapping_mul(p));
        }
        destination.set_scale(scale);
        self.consume_noise(destination, self.noise.multiply_plain_cost);
        Ok(())
    }

    fn negate(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        destination.clone_from(encrypted);
        destination.data_mut().iter_mut().for_each(|d| *d = d.wrapping_neg());
        Ok(())
    }

    fn relinearize(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        destination.clone_from(encrypted);
        let bound = self.context.ciphertext_size_bound();
        if encrypted.size() <= bound {
            return Ok(());
        }
        // Fold every component above the bound into the last kept one.
        for i in bound..encrypted.size() {
            destination.poly_mut(bound - 1).iter_mut()
                .zip(encrypted.poly(i))
                .for_each(|(d, &c)| *d = d.wrapping_add(c));
        }
        destination.resize(&self.context, encrypted.parms_id(), bound)?;
        self.consume_noise(destination, self.noise.relinearize_cost);
        Ok(())
    }

    fn mod_switch_to_next(&self, encrypted: &Ciphertext, destination: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        let context_data = self.context.context_data(encrypted.parms_id())?;
        let next = context_data.next_parms_id().ok_or(Error::EndOfModulusChain)?;
        destination.clone_from(encrypted);
        destination.set_parms_id(*next);
        Ok(())
    }

    fn plain_add(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()> {
        self.check_plaintext(plain1)?;
        self.check_plaintext(plain2)?;
        Self::match_scale(plain1.scale(), plain2.scale())?;
        Self::plain_slotwise(plain1, plain2, destination, u64::wrapping_add);
        Ok(())
    }

    fn plain_sub(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()> {
        self.check_plaintext(plain1)?;
        self.check_plaintext(plain2)?;
        Self::match_scale(plain1.scale(), plain2.scale())?;
        Self::plain_slotwise(plain1, plain2, destination, u64::wrapping_sub);
        Ok(())
    }

    fn plain_multiply(&self, plain1: &Plaintext, plain2: &Plaintext, destination: &mut Plaintext) -> Result<()> {
        self.check_plaintext(plain1)?;
        self.check_plaintext(plain2)?;
        let scale = plain1.scale() * plain2.scale();
        self.check_scale_bound(scale, None)?;
        Self::plain_slotwise(plain1, plain2, destination, u64::wrapping_mul);
        destination.set_scale(scale);
        Ok(())
    }

    fn plain_negate(&self, plain: &Plaintext, destination: &mut Plaintext) -> Result<()> {
        self.check_plaintext(plain)?;
        destination.clone_from(plain);
        destination.data_mut().iter_mut().for_each(|d| *d = d.wrapping_neg());
        Ok(())
    }

}
