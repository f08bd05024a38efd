use thiserror::Error;

use crate::{ElementType, NodeId};

/// Coarse classification of an [Error].
///
/// Precondition violations are programming errors of the caller. Scheme-level
/// mismatches mean the operands are individually fine but cannot be combined
/// under the encryption scheme's rules; fixing them is the job of an upstream
/// leveling or maintenance pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller broke a documented precondition.
    Precondition,
    /// Operands are incompatible under the scheme (level, scale, size).
    SchemeMismatch,
}

/// Common error type of the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Element types do not match: {left} and {right}, expected {expected}")]
    ElementTypeMismatch {
        left: ElementType,
        right: ElementType,
        expected: ElementType,
    },

    #[error("Output slot is not allocated")]
    OutputNotAllocated,

    #[error("Operand is not allocated")]
    OperandNotAllocated,

    #[error("Slot counts do not match: {0} and {1}")]
    SlotCountMismatch(usize, usize),

    #[error("Output slot should hold a {expected}")]
    OutputKindMismatch { expected: &'static str },

    #[error("Graph contains a cycle ({unvisited} nodes unreachable in dependency order)")]
    CyclicGraph { unvisited: usize },

    #[error("Unsupported operation `{0}`")]
    UnsupportedOperation(String),

    #[error("Node {node} takes {expected} inputs, found {found}")]
    InvalidArity {
        node: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("No input value bound to node {0}")]
    MissingInput(NodeId),

    #[error("Invalid input for node {node}: {reason}")]
    InvalidInput { node: NodeId, reason: String },

    #[error("Invalid encryption parameters: {0}")]
    InvalidParameters(String),

    #[error("Parms id is not valid for the context")]
    InvalidParmsId,

    #[error("Operands are at different modulus levels (chain index {0} and {1})")]
    ModulusLevelMismatch(usize, usize),

    #[error("Operands do not have the same scale: {0} and {1}")]
    ScaleMismatch(f64, f64),

    #[error("Scale {scale} is out of bounds, at most 2^{bound} exclusive")]
    ScaleOutOfBounds { scale: f64, bound: usize },

    #[error("Ciphertext size {size} exceeds the operable bound {bound}")]
    CiphertextSizeExceeded { size: usize, bound: usize },

    #[error("End of modulus switching chain reached")]
    EndOfModulusChain,
}

impl Error {
    /// Classify the error, see [ErrorKind].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ModulusLevelMismatch(..)
            | Error::ScaleMismatch(..)
            | Error::ScaleOutOfBounds { .. }
            | Error::CiphertextSizeExceeded { .. }
            | Error::EndOfModulusChain => ErrorKind::SchemeMismatch,
            _ => ErrorKind::Precondition,
        }
    }

    /// Shortcut for `self.kind() == ErrorKind::SchemeMismatch`.
    pub fn is_scheme_mismatch(&self) -> bool {
        self.kind() == ErrorKind::SchemeMismatch
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::ModulusLevelMismatch(2, 1).kind(), ErrorKind::SchemeMismatch);
        assert_eq!(Error::ScaleMismatch(1.0, 2.0).kind(), ErrorKind::SchemeMismatch);
        assert_eq!(Error::ScaleOutOfBounds { scale: 1.0, bound: 0 }.kind(), ErrorKind::SchemeMismatch);
        assert!(Error::CiphertextSizeExceeded { size: 3, bound: 2 }.is_scheme_mismatch());
        assert_eq!(Error::OutputNotAllocated.kind(), ErrorKind::Precondition);
        assert_eq!(Error::CyclicGraph { unvisited: 3 }.kind(), ErrorKind::Precondition);
        let mismatch = Error::ElementTypeMismatch {
            left: ElementType::F32,
            right: ElementType::I32,
            expected: ElementType::F32,
        };
        assert!(!mismatch.is_scheme_mismatch());
        assert_eq!(mismatch.to_string(), "Element types do not match: f32 and i32, expected f32");
    }
}
