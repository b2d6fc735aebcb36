//! Suffix-keyed content-type registry.

use std::io::Read;

use crate::artifact::ArtifactId;
use crate::content::ContentType;
use crate::error::{StoreError, StoreResult};

/// Maps filename suffixes to content types for one artifact kind, and
/// translates between logical artifact ids and storage keys (relative
/// filenames).
pub struct SuffixRegistry<T> {
    entries: Vec<Box<dyn ContentType<T>>>,
}

impl<T> Default for SuffixRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SuffixRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a content type. A later registration with the same suffix
    /// shadows the earlier one.
    pub fn add(&mut self, content_type: Box<dyn ContentType<T>>) {
        self.entries.insert(0, content_type);
    }

    /// Register several content types at once.
    pub fn add_all(&mut self, content_types: Vec<Box<dyn ContentType<T>>>) {
        for ct in content_types {
            self.add(ct);
        }
    }

    /// Look up the content type registered for a suffix.
    pub fn get(&self, suffix: &str) -> Option<&dyn ContentType<T>> {
        self.entries
            .iter()
            .find(|ct| ct.suffix() == suffix)
            .map(Box::as_ref)
    }

    /// Build the storage key for an artifact id under the given suffix.
    pub fn key_of(&self, id: &ArtifactId, suffix: &str) -> StoreResult<String> {
        if self.get(suffix).is_none() {
            return Err(StoreError::UnknownSuffix(suffix.to_string()));
        }
        Ok(format!("{id}.{suffix}"))
    }

    /// Split a storage key into artifact id and content type. The suffix is
    /// whatever follows the last `.`; a key without one yields the whole key
    /// as id and no content type.
    pub fn split_key(&self, key: &str) -> (ArtifactId, Option<&dyn ContentType<T>>) {
        match key.rsplit_once('.') {
            Some((stem, suffix)) => (ArtifactId::parse(stem), self.get(suffix)),
            None => (ArtifactId::parse(key), None),
        }
    }

    /// Read an artifact from a raw stream, dispatching on the storage key's
    /// suffix.
    pub fn read_keyed(&self, key: &str, input: &mut dyn Read) -> StoreResult<T> {
        let (id, content_type) = self.split_key(key);
        match content_type {
            Some(ct) => ct.read(&id, input),
            None => {
                let suffix = key.rsplit_once('.').map(|(_, s)| s).unwrap_or(key);
                Err(StoreError::UnknownSuffix(suffix.to_string()))
            }
        }
    }
}
