mod entry;

pub use entry::BlobEntry;

use crate::intake::{DroppedFile, LOCAL_SCHEME};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;


/// Origin segment of every local reference minted by this crate
const ORIGIN: &str = "judge-intake";

/// Registry of transient local object references.
///
/// Each dropped file is copied in and addressed by a `blob:` URL that is
/// only meaningful to this store. References stay alive until revoked; the
/// owning intake revokes them on replacement, deletion and teardown.
#[derive(Debug, Default)]
pub struct BlobStore {
    index: HashMap<String, BlobEntry>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new local reference for a dropped file
    pub fn create(&mut self, file: &DroppedFile) -> String {
        let url = format!("{}{}/{}", LOCAL_SCHEME, ORIGIN, Uuid::new_v4());
        let digest = hex::encode(Sha256::digest(&file.bytes));

        self.index.insert(
            url.clone(),
            BlobEntry {
                name: file.name.clone(),
                digest,
                bytes: file.bytes.clone(),
            },
        );

        url
    }

    /// Get the contents behind a reference
    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.index.get(url).map(|entry| entry.bytes.as_slice())
    }

    /// Get metadata for a reference without copying contents
    pub fn get_entry(&self, url: &str) -> Option<&BlobEntry> {
        self.index.get(url)
    }

    /// Release one reference. Returns false if it was unknown or already released.
    pub fn revoke(&mut self, url: &str) -> bool {
        self.index.remove(url).is_some()
    }

    /// Release every reference, returning how many were live
    pub fn revoke_all(&mut self) -> usize {
        let count = self.index.len();
        self.index.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total bytes held by live references
    pub fn total_size(&self) -> usize {
        self.index.values().map(|entry| entry.bytes.len()).sum()
    }
}
