use crate::intake::IntakeError;

/// Directory created by macOS archivers to hold resource forks
const RESOURCE_FORK_DIR: &str = "__MACOSX";

/// Outcome of checking one entry from a directory walk or archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryName {
    /// Stage the entry under this bare file name
    Accept(String),
    /// Leave the entry out of the batch
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A component starts with `.` (.DS_Store, ._1.in, .git/)
    Hidden,
    /// Lives under `__MACOSX/`
    ResourceFork,
}

/// Decides how entry paths turn into batch file names.
///
/// Entries that try to leave their root are errors; platform metadata is
/// skipped; everything else is staged under its last component, the way a
/// browser file picker hands over bare names.
pub struct NameSanitizer;

impl NameSanitizer {
    pub fn classify(raw_path: &str) -> Result<EntryName, IntakeError> {
        if raw_path.is_empty() {
            return Err(IntakeError::InvalidPath("Empty path".to_string()));
        }
        if raw_path.contains('\0') {
            return Err(IntakeError::InvalidPath(format!(
                "NUL byte in path: {:?}",
                raw_path
            )));
        }
        if raw_path.starts_with(['/', '\\']) || has_drive_prefix(raw_path) {
            return Err(IntakeError::InvalidPath(format!(
                "Absolute path not allowed: {}",
                raw_path
            )));
        }

        // Archives written on Windows use backslashes
        let segments: Vec<&str> = raw_path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();

        if segments.contains(&"..") {
            return Err(IntakeError::InvalidPath(format!(
                "Parent directory traversal not allowed: {}",
                raw_path
            )));
        }

        let Some(last) = segments.last() else {
            return Err(IntakeError::InvalidPath(format!(
                "No file name in path: {}",
                raw_path
            )));
        };

        if segments.contains(&RESOURCE_FORK_DIR) {
            return Ok(EntryName::Skip(SkipReason::ResourceFork));
        }
        if segments.iter().any(|segment| segment.starts_with('.')) {
            return Ok(EntryName::Skip(SkipReason::Hidden));
        }

        Ok(EntryName::Accept(last.to_string()))
    }
}

fn has_drive_prefix(raw_path: &str) -> bool {
    let bytes = raw_path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
