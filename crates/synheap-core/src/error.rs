//! Error types for the syntactic heap model.

use thiserror::Error;

use crate::schema::Opcode;

/// Errors raised while building or resolving a [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No descriptor is bound to the opcode (unregistered, reserved, or
    /// from a schema revision this build does not know).
    #[error("unknown opcode {0}")]
    UnknownOpcode(Opcode),

    /// A section or descriptor name is already taken.
    #[error("duplicate binding: {0}")]
    DuplicateBinding(String),

    /// A section ran out of slots, or the opcode space ran out of sections.
    #[error("section overflow: {0}")]
    SectionOverflow(String),

    /// The named section was never registered.
    #[error("unknown section `{0}`")]
    UnknownSection(String),
}

/// Errors raised while constructing items or decoding a byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Operand count or payload shape disagrees with the bound descriptor.
    #[error("arity mismatch for `{name}`: expected {expected}, found {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// The stream ended before the current field was fully read.
    #[error("unexpected end of stream at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The stream does not begin with the expected magic number.
    #[error("bad magic number: expected {expected:?}, found {found:?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    /// The stream was produced under an incompatible format or schema.
    #[error("version mismatch: {0}")]
    VersionMismatch(String),

    /// A varint field is malformed or too wide for its target type.
    #[error("malformed varint at offset {offset}")]
    MalformedVarint { offset: usize },

    /// Bytes remain after the root trailer.
    #[error("{remaining} trailing bytes after root trailer")]
    TrailingData { remaining: usize },
}

/// Errors raised while resolving item or root references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// An index that names no allocated item.
    #[error("dangling reference: index {index} out of bounds for heap of size {bound}")]
    DanglingReference { index: u32, bound: u32 },

    /// The heap has no root; it must not be serialized or handed off.
    #[error("heap root is unset")]
    RootUnset,

    /// An operand position past the end of an item's operand list.
    #[error("operand position {position} out of range for item with {count} operands")]
    IndexOutOfBounds { position: usize, count: usize },

    /// A typed accessor was applied to an item of a different kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
}

/// Any error the heap model can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Result type used throughout the heap model.
pub type Result<T> = std::result::Result<T, Error>;
