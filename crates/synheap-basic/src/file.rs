//! `.bil` artifacts: a heap wrapped with identity and provenance.

use std::io::{Read, Write};

use synheap_codec::{decode_from, encode_to};
use synheap_core::{Heap, ItemIndex};
use synheap_store::{Artifact, ArtifactId, ContentType, Marker, StoreResult};

use crate::nodes::MarkerItem;
use crate::schema::{schema, OP_MARKER};

/// Filename suffix for compiled program binaries.
pub const SUFFIX: &str = "bil";

/// A compiled program: its syntactic heap, its logical path, and the
/// identities of the source artifacts it was derived from. The codec never
/// looks at the metadata; only the build layer does.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicFile {
    id: ArtifactId,
    sources: Vec<ArtifactId>,
    heap: Heap,
}

impl BasicFile {
    pub fn new(id: ArtifactId, sources: Vec<ArtifactId>, heap: Heap) -> Self {
        Self { id, sources, heap }
    }

    /// The decoded heap.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Extract all diagnostic markers from the heap, in allocation order.
    /// Marker items whose payload is not valid UTF-8 are skipped.
    pub fn markers(&self) -> Vec<BasicMarker> {
        self.heap
            .match_all(|item| item.opcode() == OP_MARKER)
            .into_iter()
            .filter_map(|item| {
                let marker = MarkerItem::try_from(item).ok()?;
                Some(BasicMarker {
                    message: marker.message().ok()?.to_string(),
                    target: marker.target_index().ok()?,
                    source: self.id.clone(),
                })
            })
            .collect()
    }
}

impl Artifact for BasicFile {
    fn id(&self) -> &ArtifactId {
        &self.id
    }

    fn sources(&self) -> &[ArtifactId] {
        &self.sources
    }
}

/// A diagnostic extracted from a program heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicMarker {
    message: String,
    target: ItemIndex,
    source: ArtifactId,
}

impl Marker for BasicMarker {
    fn message(&self) -> &str {
        &self.message
    }

    fn target(&self) -> ItemIndex {
        self.target
    }

    fn source(&self) -> &ArtifactId {
        &self.source
    }
}

/// Content type for `.bil` streams; raw stream I/O is delegated to the heap
/// codec under the program schema.
pub struct BasicContentType;

impl ContentType<BasicFile> for BasicContentType {
    fn suffix(&self) -> &'static str {
        SUFFIX
    }

    fn read(&self, id: &ArtifactId, mut input: &mut dyn Read) -> StoreResult<BasicFile> {
        let heap = decode_from(&mut input, schema())?;
        Ok(BasicFile::new(id.clone(), Vec::new(), heap))
    }

    fn write(&self, mut output: &mut dyn Write, value: &BasicFile) -> StoreResult<()> {
        encode_to(&mut output, value.heap(), schema())?;
        Ok(())
    }
}
