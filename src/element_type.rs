use std::fmt;

/// Scalar numeric type of the values carried by a [Plaintext](crate::Plaintext)
/// or [Ciphertext](crate::Ciphertext).
///
/// Produced by the host type system. Both operands of a binary kernel must carry
/// the same element type, and it must equal the type requested by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Boolean, encoded as 0 / 1.
    Boolean,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
}

impl ElementType {

    /// All supported element types.
    pub const ALL: [ElementType; 7] = [
        ElementType::Boolean,
        ElementType::F32,
        ElementType::F64,
        ElementType::I32,
        ElementType::I64,
        ElementType::U32,
        ElementType::U64,
    ];

    /// Is this a floating point type? Real types are encoded in fixed point.
    pub fn is_real(&self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// Is this a signed type?
    pub fn is_signed(&self) -> bool {
        !matches!(self, ElementType::Boolean | ElementType::U32 | ElementType::U64)
    }

    /// Size of one element in bytes on the host side.
    pub fn size(&self) -> usize {
        match self {
            ElementType::Boolean => 1,
            ElementType::F32 | ElementType::I32 | ElementType::U32 => 4,
            ElementType::F64 | ElementType::I64 | ElementType::U64 => 8,
        }
    }

    /// Short name, as used in error messages.
    pub fn c_type_string(&self) -> &'static str {
        match self {
            ElementType::Boolean => "boolean",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_type_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type() {
        assert!(ElementType::F32.is_real());
        assert!(!ElementType::I64.is_real());
        assert!(!ElementType::U32.is_signed());
        assert_eq!(ElementType::F64.size(), 8);
        assert_eq!(ElementType::ALL.len(), 7);
        let json = serde_json::to_string(&ElementType::I32).unwrap();
        assert_eq!(json, "\"i32\"");
    }
}
