use crate::intake::{DroppedFile, IntakeError};
use crate::security::{EntryName, NameSanitizer};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use walkdir::WalkDir;

#[cfg(test)]
mod tests;

/// Assembles one intake batch from loose files, directories and ZIP archives.
///
/// Files keep the order they were added in; directories are walked in
/// file-name order so repeated runs produce the same batch.
pub struct BatchBuilder {
    files: Vec<DroppedFile>,
    total_size: u64,
    max_file_size: u64,
    max_total_size: u64,
}

impl BatchBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            total_size: 0,
            max_file_size: 64 * 1024 * 1024,   // 64 MB per file
            max_total_size: 512 * 1024 * 1024, // 512 MB per batch
        }
    }

    /// Set maximum individual file size
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set maximum total batch size
    pub fn max_total_size(mut self, size: u64) -> Self {
        self.max_total_size = size;
        self
    }

    /// Add one file under the final component of `raw_path`.
    ///
    /// Returns false when the entry is platform metadata and was skipped.
    pub fn add_file(&mut self, raw_path: &str, data: &[u8]) -> Result<bool, IntakeError> {
        let Some(name) = self.admit(raw_path, data.len() as u64)? else {
            return Ok(false);
        };
        self.stage(name, data.to_vec())?;
        Ok(true)
    }

    /// Add several paths as one batch, the way a multi-select picker does
    pub fn add_paths<P: AsRef<Path>>(self, paths: &[P]) -> Result<Self, IntakeError> {
        paths
            .iter()
            .try_fold(self, |builder, path| builder.add_path(path.as_ref()))
    }

    /// Add a path the way a file picker would: directories are walked,
    /// `.zip` archives are expanded, anything else is a single file
    pub fn add_path(mut self, path: &Path) -> Result<Self, IntakeError> {
        if path.is_dir() {
            return self.add_dir(path);
        }

        let is_zip = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if is_zip {
            return self.add_zip(path);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let size = file_len(path)?;
        if let Some(name) = self.admit(&name, size)? {
            let data = self.read_bounded(path)?;
            self.stage(name, data)?;
        }
        Ok(self)
    }

    /// Add every regular file below `dir`, skipping hidden entries
    pub fn add_dir(mut self, dir: &Path) -> Result<Self, IntakeError> {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| IntakeError::ReadFailed {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();

            let size = file_len(entry.path())?;
            if let Some(name) = self.admit(&relative, size)? {
                let data = self.read_bounded(entry.path())?;
                self.stage(name, data)?;
            }
        }

        Ok(self)
    }

    /// Expand a ZIP archive from disk
    pub fn add_zip(self, path: &Path) -> Result<Self, IntakeError> {
        let data = std::fs::read(path).map_err(|e| read_failed(path, e))?;
        self.add_zip_bytes(&data)
    }

    /// Expand an in-memory ZIP archive.
    ///
    /// Declared entry sizes are checked before extraction and every read is
    /// capped, so an entry lying about its size still cannot exceed the limit.
    pub fn add_zip_bytes(mut self, data: &[u8]) -> Result<Self, IntakeError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| IntakeError::ZipParseFailed(e.to_string()))?;

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| IntakeError::ZipParseFailed(e.to_string()))?;

            if file.is_dir() {
                continue;
            }

            let raw_path = file.name().to_string();
            let Some(name) = self.admit(&raw_path, file.size())? else {
                continue;
            };

            let mut contents = Vec::new();
            file.by_ref()
                .take(self.max_file_size.saturating_add(1))
                .read_to_end(&mut contents)
                .map_err(|e| IntakeError::ZipParseFailed(e.to_string()))?;

            self.stage(name, contents)?;
        }

        Ok(self)
    }

    /// Name policy plus a size check against the declared length
    fn admit(&self, raw_path: &str, size: u64) -> Result<Option<String>, IntakeError> {
        match NameSanitizer::classify(raw_path)? {
            EntryName::Accept(name) => {
                self.check_size(size)?;
                Ok(Some(name))
            }
            EntryName::Skip(reason) => {
                tracing::debug!(path = raw_path, ?reason, "skipping entry");
                Ok(None)
            }
        }
    }

    fn check_size(&self, size: u64) -> Result<(), IntakeError> {
        if size > self.max_file_size {
            return Err(IntakeError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        let new_total = self.total_size + size;
        if new_total > self.max_total_size {
            return Err(IntakeError::BatchTooLarge {
                size: new_total,
                max: self.max_total_size,
            });
        }

        Ok(())
    }

    /// Re-check the bytes actually read, then append
    fn stage(&mut self, name: String, data: Vec<u8>) -> Result<(), IntakeError> {
        let size = data.len() as u64;
        self.check_size(size)?;
        self.total_size += size;
        self.files.push(DroppedFile::new(name, data));
        Ok(())
    }

    /// Read at most one byte past the per-file limit
    fn read_bounded(&self, path: &Path) -> Result<Vec<u8>, IntakeError> {
        let file = File::open(path).map_err(|e| read_failed(path, e))?;
        let mut data = Vec::new();
        file.take(self.max_file_size.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|e| read_failed(path, e))?;
        Ok(data)
    }

    /// Number of files collected so far
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total bytes collected so far
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Finish the batch
    pub fn build(self) -> Vec<DroppedFile> {
        self.files
    }
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn file_len(path: &Path) -> Result<u64, IntakeError> {
    std::fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| read_failed(path, e))
}

fn read_failed(path: &Path, e: std::io::Error) -> IntakeError {
    IntakeError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
