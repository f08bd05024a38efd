pub const HE_POLY_MOD_DEGREE_MAX: usize = 131072;
pub const HE_POLY_MOD_DEGREE_MIN: usize = 2;

pub const HE_COEFF_MOD_COUNT_MAX: usize = 64;
pub const HE_COEFF_MOD_COUNT_MIN: usize = 1;

pub const HE_USER_MOD_BIT_COUNT_MAX: usize = 60;
pub const HE_USER_MOD_BIT_COUNT_MIN: usize = 2;

pub const HE_CIPHERTEXT_SIZE_MAX: usize = 16;
pub const HE_CIPHERTEXT_SIZE_MIN: usize = 2;

pub const HE_SCALE_BIT_COUNT_MAX: u32 = 30;

#[inline]
pub fn are_close_f64(value1: f64, value2: f64) -> bool {
    let scale_factor = value1.max(value2).max(1.0);
    (value1 - value2).abs() < f64::EPSILON * scale_factor
}
