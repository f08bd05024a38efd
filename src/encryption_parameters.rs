use crate::{util, Error, Result};

/// Describes the type of encryption scheme to be used.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum SchemeType {
    /// Fallback. Not valid for encryption.
    #[default]
    None,
    /// Brakerski/Fan-Vercauteren Scheme.
    BFV,
    /// Cheon-Kim-Kim-Song Scheme.
    CKKS,
    /// Brakerski-Gentry-Vaikuntanathan Scheme.
    BGV,
}

impl From<SchemeType> for u8 {
    fn from(val: SchemeType) -> Self {
        match val {
            SchemeType::None => 0,
            SchemeType::BFV => 1,
            SchemeType::CKKS => 2,
            SchemeType::BGV => 3,
        }
    }
}

/// A unique identifier for a set (level) of encryption parameters.
pub type ParmsID = crate::util::hash::HashBlock;

/// The default zero ParmsID, never assigned to a valid level.
pub const PARMS_ID_ZERO: ParmsID = crate::util::hash::HASH_ZERO_BLOCK;

/// A set of parameters defining the encryption scheme.
///
/// It includes [SchemeType], polynomial modulus degree, the bit sizes of the
/// coefficient moduli chain, the plain modulus (BFV/BGV) and the fixed-point
/// scale used to encode real element types. The parameters are supplied by the
/// host; this crate does not search for good parameters.
///
/// ```rust
/// # use hexec::*;
/// let parms = EncryptionParameters::new(SchemeType::CKKS)
///     .set_poly_modulus_degree(8192)
///     .set_coeff_modulus_bits(&[60, 40, 40, 60])
///     .set_scale_bits(20);
/// assert!(parms.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "ParametersConfig")]
pub struct EncryptionParameters {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus_bits: Vec<usize>,
    plain_modulus: u64,
    scale_bits: u32,
    #[serde(skip_serializing)]
    parms_id: ParmsID,
}

/// Serialized form of [EncryptionParameters]; the parms id is always recomputed.
#[derive(serde::Deserialize)]
struct ParametersConfig {
    scheme: SchemeType,
    poly_modulus_degree: usize,
    coeff_modulus_bits: Vec<usize>,
    #[serde(default)]
    plain_modulus: u64,
    #[serde(default = "default_scale_bits")]
    scale_bits: u32,
}

fn default_scale_bits() -> u32 {
    20
}

impl From<ParametersConfig> for EncryptionParameters {
    fn from(config: ParametersConfig) -> Self {
        EncryptionParameters::new(config.scheme)
            .set_poly_modulus_degree(config.poly_modulus_degree)
            .set_coeff_modulus_bits(&config.coeff_modulus_bits)
            .set_plain_modulus(config.plain_modulus)
            .set_scale_bits(config.scale_bits)
    }
}

impl EncryptionParameters {

    /// What HE scheme do we use?
    pub fn scheme(&self) -> SchemeType {self.scheme}

    /// Polynomial modulus degree N. This is also the number of slots of a value.
    pub fn poly_modulus_degree(&self) -> usize {self.poly_modulus_degree}

    /// Bit sizes of the coefficient moduli chain q = q_0 * q_1 * ... * q_k.
    pub fn coeff_modulus_bits(&self) -> &[usize] {
        &self.coeff_modulus_bits
    }

    /// Plain modulus t. Zero for CKKS.
    pub fn plain_modulus(&self) -> u64 {self.plain_modulus}

    /// Number of fractional bits used when encoding real element types.
    pub fn scale_bits(&self) -> u32 {self.scale_bits}

    /// The unique identifier for the encryption parameters.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Creates a new EncryptionParameters object with the specified scheme.
    /// Usually the user just set the params after creating an instance.
    pub fn new(scheme: SchemeType) -> Self {
        let mut ret = EncryptionParameters {
            scheme,
            poly_modulus_degree: 0,
            coeff_modulus_bits: vec![],
            plain_modulus: 0,
            scale_bits: default_scale_bits(),
            parms_id: PARMS_ID_ZERO,
        };
        ret.compute_parms_id();
        ret
    }

    /// See [EncryptionParameters::new] for an example.
    pub fn set_poly_modulus_degree(mut self, poly_modulus_degree: usize) -> Self {
        self.poly_modulus_degree = poly_modulus_degree;
        self.compute_parms_id();
        self
    }

    /// See [EncryptionParameters::new] for an example.
    pub fn set_coeff_modulus_bits(mut self, coeff_modulus_bits: &[usize]) -> Self {
        self.coeff_modulus_bits = coeff_modulus_bits.to_vec();
        self.compute_parms_id();
        self
    }

    /// See [EncryptionParameters::new] for an example.
    pub fn set_plain_modulus(mut self, plain_modulus: u64) -> Self {
        self.plain_modulus = plain_modulus;
        self.compute_parms_id();
        self
    }

    /// See [EncryptionParameters::new] for an example.
    pub fn set_scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = scale_bits;
        self.compute_parms_id();
        self
    }

    /// Check the parameters against the bounds supported by the crate.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(Error::InvalidParameters(reason.to_string()));
        if self.scheme == SchemeType::None {
            return invalid("scheme must be BFV, CKKS or BGV");
        }
        let degree = self.poly_modulus_degree;
        if !degree.is_power_of_two() || !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&degree) {
            return invalid("poly_modulus_degree must be a power of two within bounds");
        }
        let count = self.coeff_modulus_bits.len();
        if !(util::HE_COEFF_MOD_COUNT_MIN..=util::HE_COEFF_MOD_COUNT_MAX).contains(&count) {
            return invalid("coeff_modulus count is out of bounds");
        }
        if self.coeff_modulus_bits.iter()
            .any(|bits| !(util::HE_USER_MOD_BIT_COUNT_MIN..=util::HE_USER_MOD_BIT_COUNT_MAX).contains(bits))
        {
            return invalid("coeff_modulus bit count is out of bounds");
        }
        match self.scheme {
            SchemeType::BFV | SchemeType::BGV if self.plain_modulus < 2 => {
                return invalid("plain_modulus must be set for BFV/BGV");
            }
            SchemeType::CKKS if self.plain_modulus != 0 => {
                return invalid("plain_modulus is not supported for CKKS");
            }
            _ => {}
        }
        if self.scale_bits > util::HE_SCALE_BIT_COUNT_MAX {
            return invalid("scale_bits is too large");
        }
        Ok(())
    }

    /// Copy of the parameters with the last `drop` coefficient moduli removed.
    /// Used to derive the levels of the modulus switching chain.
    pub(crate) fn drop_last_moduli(&self, drop: usize) -> Self {
        let keep = self.coeff_modulus_bits.len().saturating_sub(drop);
        self.clone().set_coeff_modulus_bits(&self.coeff_modulus_bits[..keep])
    }

    fn compute_parms_id(&mut self) {
        let mut param_data = Vec::with_capacity(4 + self.coeff_modulus_bits.len());
        param_data.push(u8::from(self.scheme) as u64);
        param_data.push(self.poly_modulus_degree as u64);
        param_data.extend(self.coeff_modulus_bits.iter().map(|&x| x as u64));
        param_data.push(self.plain_modulus);
        param_data.push(self.scale_bits as u64);
        util::hash::hash(&param_data, &mut self.parms_id);
    }

}
