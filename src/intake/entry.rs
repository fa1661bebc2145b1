use serde::{Deserialize, Serialize};

/// URL scheme used for transient local references
pub const LOCAL_SCHEME: &str = "blob:";

/// One staged artifact: a freshly dropped file behind a local reference,
/// or a file already hosted at a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub name: String,
    pub url: String,
}

impl FileObject {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// True when the URL only lives as long as the intake that minted it
    pub fn is_local(&self) -> bool {
        self.url.starts_with(LOCAL_SCHEME)
    }
}

/// A matched input/output test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    #[serde(rename = "in")]
    pub input: FileObject,
    #[serde(rename = "out")]
    pub output: FileObject,
}

/// A file as delivered by one drop or browse interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// Bare file name (no directory part), original casing
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}
