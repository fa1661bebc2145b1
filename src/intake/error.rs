use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to parse ZIP archive: {0}")]
    ZipParseFailed(String),

    #[error("Invalid path in batch: {0}")]
    InvalidPath(String),

    #[error("File too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Batch too large: {size} bytes (max: {max})")]
    BatchTooLarge { size: u64, max: u64 },
}
