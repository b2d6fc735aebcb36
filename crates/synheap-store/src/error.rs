//! Store error type.

use std::io;

use thiserror::Error;

use synheap_codec::CodecError;

/// Errors surfaced by content-type dispatch and stream delegation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No content type is registered for the suffix.
    #[error("no content type registered for suffix `{0}`")]
    UnknownSuffix(String),

    /// The delegated codec rejected the stream.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Store result type alias.
pub type StoreResult<T> = Result<T, StoreError>;
