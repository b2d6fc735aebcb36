//! Content-type seam.

use std::io::{Read, Write};

use crate::artifact::ArtifactId;
use crate::error::StoreResult;

/// Couples a filename suffix with raw-stream read/write for one artifact
/// kind. Implementations for heap-backed artifacts delegate straight to the
/// codec's decoder and encoder.
pub trait ContentType<T> {
    /// Filename suffix (without the dot) identifying this content type.
    fn suffix(&self) -> &'static str;

    /// Read a value from a raw stream, binding it to the given identity.
    fn read(&self, id: &ArtifactId, input: &mut dyn Read) -> StoreResult<T>;

    /// Write a value to a raw stream.
    fn write(&self, output: &mut dyn Write, value: &T) -> StoreResult<()>;
}
