use crate::{ElementType, Error, HeContext, ParmsID, PARMS_ID_ZERO, Result, util};

/// Struct to store a plaintext element.
///
/// The data is an encoded vector of `slot_count` words, opaque to this crate.
/// The encoding is defined by the [Backend](crate::Backend) that produced it;
/// for real element types the payload is a fixed-point encoding at
/// [Plaintext::scale]. A plaintext has no noise budget and never grows.
///
/// A plaintext created with [Plaintext::new] is an unallocated container.
/// Kernels only ever fill containers that the host allocated beforehand with
/// [Plaintext::allocate].
///
/// See [Ciphertext] for the class that stores ciphertexts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plaintext {
    element_type: ElementType,
    slot_count: usize,
    data: Vec<u64>,
    scale: f64,
}

impl Plaintext {

    /// Creates an empty, unallocated plaintext.
    pub fn new(element_type: ElementType) -> Self {
        Plaintext { element_type, slot_count: 0, data: vec![], scale: 1.0 }
    }

    /// Creates a zero plaintext holding `slot_count` values.
    pub fn allocate(element_type: ElementType, slot_count: usize) -> Self {
        Plaintext { element_type, slot_count, data: vec![0; slot_count], scale: 1.0 }
    }

    /// Create a plaintext from raw members.
    pub fn from_members(element_type: ElementType, data: Vec<u64>, scale: f64) -> Self {
        Plaintext { element_type, slot_count: data.len(), data, scale }
    }

    /// The element type of the encoded values.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of encoded values.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Has the container been allocated by the host?
    pub fn is_allocated(&self) -> bool {
        self.slot_count > 0
    }

    /// The fixed-point scale of the plaintext.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sets the fixed-point scale of the plaintext.
    pub fn set_scale(&mut self, new_scale: f64) {
        self.scale = new_scale;
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    /// Returns a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [u64] {
        &mut self.data
    }

}

/// Struct to store a ciphertext element.
///
/// The data for a ciphertext consists of two or more polynomials ("components"),
/// each holding `slot_count` words. A fresh ciphertext has
/// [HeContext::ciphertext_size_bound] components; a ciphertext-ciphertext
/// multiplication of sizes K and L yields size K+L-1, and relinearization
/// brings the size back down. A ciphertext also carries the [ParmsID] of its
/// level in the modulus switching chain, which is checked before two
/// ciphertexts are combined, and its remaining noise budget in bits.
///
/// See [Plaintext] for the class that stores plaintexts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    element_type: ElementType,
    size: usize,
    slot_count: usize,
    data: Vec<u64>,
    parms_id: ParmsID,
    scale: f64,
    noise_budget: u32,
}

impl Ciphertext {

    /// Creates an empty, unallocated ciphertext.
    pub fn new(element_type: ElementType) -> Self {
        Ciphertext {
            element_type,
            size: 0,
            slot_count: 0,
            data: vec![],
            parms_id: PARMS_ID_ZERO,
            scale: 1.0,
            noise_budget: 0,
        }
    }

    /// Creates a zero ciphertext of minimal size at the first level of `context`.
    pub fn allocate(context: &HeContext, element_type: ElementType, slot_count: usize) -> Self {
        let size = util::HE_CIPHERTEXT_SIZE_MIN;
        Ciphertext {
            element_type,
            size,
            slot_count,
            data: vec![0; size * slot_count],
            parms_id: *context.first_parms_id(),
            scale: 1.0,
            noise_budget: 0,
        }
    }

    /// The element type of the encrypted values.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of encrypted values.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Has the container been allocated by the host?
    pub fn is_allocated(&self) -> bool {
        self.slot_count > 0 && self.size >= util::HE_CIPHERTEXT_SIZE_MIN
    }

    /// The [ParmsID] of the ciphertext.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Set the [ParmsID] of the ciphertext.
    pub fn set_parms_id(&mut self, parms_id: ParmsID) {
        self.parms_id = parms_id;
    }

    /// The fixed-point scale of the ciphertext.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the fixed-point scale of the ciphertext.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Remaining noise budget in bits.
    pub fn noise_budget(&self) -> u32 {
        self.noise_budget
    }

    /// Set the remaining noise budget in bits.
    pub fn set_noise_budget(&mut self, noise_budget: u32) {
        self.noise_budget = noise_budget;
    }

    /// The number of polynomials in the ciphertext,
    /// not the total count of coefficients in the polynomials.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    /// Returns a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [u64] {
        &mut self.data
    }

    /// Resize the ciphertext to the given size (number of polynomials) and move
    /// it to the level `parms_id`. New polynomials are zero.
    pub fn resize(&mut self, context: &HeContext, parms_id: &ParmsID, size: usize) -> Result<()> {
        context.context_data(parms_id)?;
        if !(util::HE_CIPHERTEXT_SIZE_MIN..=util::HE_CIPHERTEXT_SIZE_MAX).contains(&size) {
            return Err(Error::CiphertextSizeExceeded { size, bound: util::HE_CIPHERTEXT_SIZE_MAX });
        }
        self.parms_id = *parms_id;
        self.data.resize(size * self.slot_count, 0);
        self.size = size;
        Ok(())
    }

    /// Returns a reference to the polynomial at the given index.
    pub fn poly(&self, id: usize) -> &[u64] {
        let d = self.slot_count;
        &self.data[id * d..(id + 1) * d]
    }

    /// Returns a mutable reference to the polynomial at the given index.
    pub fn poly_mut(&mut self, id: usize) -> &mut [u64] {
        let d = self.slot_count;
        &mut self.data[id * d..(id + 1) * d]
    }

}
