use crate::{Ciphertext, ElementType, HeContext, Plaintext};

/// Which representation a value has.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub enum ValueKind {
    /// Encrypted.
    Cipher,
    /// Encoded but not encrypted.
    Plain,
}

impl ValueKind {

    /// Kind of the result of a binary arithmetic operation: plaintext only when
    /// both operands are plaintexts.
    pub fn combine(self, other: ValueKind) -> ValueKind {
        match (self, other) {
            (ValueKind::Plain, ValueKind::Plain) => ValueKind::Plain,
            _ => ValueKind::Cipher,
        }
    }

    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Cipher => "ciphertext",
            ValueKind::Plain => "plaintext",
        }
    }
}

/// A value flowing through an encrypted graph: either a ciphertext or a
/// plaintext-encoded value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EncryptedValue {
    /// Ciphertext handle.
    Cipher(Ciphertext),
    /// Plaintext handle.
    Plain(Plaintext),
}

impl EncryptedValue {

    /// Allocates an output container of the given kind.
    pub fn allocate(kind: ValueKind, context: &HeContext, element_type: ElementType, slot_count: usize) -> Self {
        match kind {
            ValueKind::Cipher => EncryptedValue::Cipher(Ciphertext::allocate(context, element_type, slot_count)),
            ValueKind::Plain => EncryptedValue::Plain(Plaintext::allocate(element_type, slot_count)),
        }
    }

    /// The representation of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            EncryptedValue::Cipher(_) => ValueKind::Cipher,
            EncryptedValue::Plain(_) => ValueKind::Plain,
        }
    }

    /// The element type of the carried values.
    pub fn element_type(&self) -> ElementType {
        match self {
            EncryptedValue::Cipher(c) => c.element_type(),
            EncryptedValue::Plain(p) => p.element_type(),
        }
    }

    /// Number of carried values.
    pub fn slot_count(&self) -> usize {
        match self {
            EncryptedValue::Cipher(c) => c.slot_count(),
            EncryptedValue::Plain(p) => p.slot_count(),
        }
    }

    /// Has the container been allocated by the host?
    pub fn is_allocated(&self) -> bool {
        match self {
            EncryptedValue::Cipher(c) => c.is_allocated(),
            EncryptedValue::Plain(p) => p.is_allocated(),
        }
    }

    /// The ciphertext, if this is one.
    pub fn as_cipher(&self) -> Option<&Ciphertext> {
        match self {
            EncryptedValue::Cipher(c) => Some(c),
            EncryptedValue::Plain(_) => None,
        }
    }

    /// The plaintext, if this is one.
    pub fn as_plain(&self) -> Option<&Plaintext> {
        match self {
            EncryptedValue::Plain(p) => Some(p),
            EncryptedValue::Cipher(_) => None,
        }
    }
}

impl From<Ciphertext> for EncryptedValue {
    fn from(value: Ciphertext) -> Self {
        EncryptedValue::Cipher(value)
    }
}

impl From<Plaintext> for EncryptedValue {
    fn from(value: Plaintext) -> Self {
        EncryptedValue::Plain(value)
    }
}
