//! Codec error type.

use std::io;

use thiserror::Error;

use synheap_core::{FormatError, ReferenceError, SchemaError};

/// Errors that can occur while encoding or decoding a heap stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

impl From<synheap_core::Error> for CodecError {
    fn from(err: synheap_core::Error) -> Self {
        match err {
            synheap_core::Error::Schema(e) => Self::Schema(e),
            synheap_core::Error::Format(e) => Self::Format(e),
            synheap_core::Error::Reference(e) => Self::Reference(e),
        }
    }
}

/// Codec result type alias.
pub type CodecResult<T> = Result<T, CodecError>;
