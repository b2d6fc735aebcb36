//! Artifact identity and provenance.

use std::fmt;

use synheap_core::ItemIndex;

/// Logical identity of an artifact: a `/`-separated hierarchical path,
/// independent of any filesystem layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId {
    segments: Vec<String>,
}

impl ArtifactId {
    /// Parse a `/`-separated path. Empty segments are dropped, so
    /// `"a//b/"` and `"a/b"` name the same artifact.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Extend this id with one more segment.
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// A decoded value wrapped with identity and provenance. The codec treats
/// all of this as opaque metadata; only the build layer interprets it.
pub trait Artifact {
    /// Logical path of this artifact.
    fn id(&self) -> &ArtifactId;

    /// Identities of the artifacts this one was derived from.
    fn sources(&self) -> &[ArtifactId];
}

/// A diagnostic annotation attached to a heap item: a syntax error, a
/// warning, or any other position worth reporting to the user. Extraction
/// walks a decoded heap with `match_all`; the semantics live entirely with
/// the consumer.
pub trait Marker {
    /// Human-readable message.
    fn message(&self) -> &str;

    /// The heap item this marker is attached to.
    fn target(&self) -> ItemIndex;

    /// Identity of the source artifact the marker refers back to.
    fn source(&self) -> &ArtifactId;
}
