/// Contents and metadata behind one local reference
#[derive(Debug, Clone)]
pub struct BlobEntry {
    /// Name of the file the reference was minted for
    pub name: String,
    /// Hex-encoded SHA-256 of the contents
    pub digest: String,
    pub bytes: Vec<u8>,
}
