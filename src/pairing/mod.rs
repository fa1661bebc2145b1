//! Name-based discovery of `.in`/`.out` test case pairs.
//!
//! A file is eligible when its last `.`-separated segment equals `in` or
//! `out` (ASCII case-insensitive). Its pairing key is the name with that
//! segment and the preceding `.` removed.

use crate::intake::{FileObject, Pair};


/// Display name used when a hydrated PDF URL has no usable last segment
pub const PDF_FALLBACK_NAME: &str = "Unknown PDF";

/// Display name used when a hydrated test case URL has no usable last segment
pub const FILE_FALLBACK_NAME: &str = "Unknown File";

/// Which half of a test case a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Input,
    Output,
}

impl CaseKind {
    /// Classify an extension segment
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("in") {
            Some(CaseKind::Input)
        } else if extension.eq_ignore_ascii_case("out") {
            Some(CaseKind::Output)
        } else {
            None
        }
    }

    pub fn counterpart(self) -> Self {
        match self {
            CaseKind::Input => CaseKind::Output,
            CaseKind::Output => CaseKind::Input,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            CaseKind::Input => "in",
            CaseKind::Output => "out",
        }
    }
}

/// Split a file name into (base name, last extension segment).
///
/// A name without any `.` has an empty base and the whole name as its
/// extension: a bare `in` or `out` is eligible with an empty pairing key.
pub fn split_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or(("", name))
}

/// Pairing key and kind of an eligible file name
pub fn classify(name: &str) -> Option<(&str, CaseKind)> {
    let (base, extension) = split_name(name);
    CaseKind::from_extension(extension).map(|kind| (base, kind))
}

/// Pairing key of an eligible file name
pub fn pairing_key(name: &str) -> Option<&str> {
    classify(name).map(|(key, _)| key)
}

/// Exact name a counterpart must carry: `<base>.<in|out>`, lower-case extension
pub fn counterpart_name(name: &str) -> Option<String> {
    classify(name).map(|(base, kind)| format!("{}.{}", base, kind.counterpart().extension()))
}

/// Run one matching pass over a batch of names.
///
/// Returns index pairs `(current, counterpart)` into `names`, in the order
/// they were matched. Files are taken from the front of the unprocessed
/// remainder; the counterpart is looked up anywhere in the remainder by
/// exact name. Unmatched and ineligible names are dropped.
pub fn match_batch<S: AsRef<str>>(names: &[S]) -> Vec<(usize, usize)> {
    let mut remaining: Vec<usize> = (0..names.len()).collect();
    let mut matched = Vec::new();

    while let Some(&current) = remaining.first() {
        let name = names[current].as_ref();

        let Some(wanted) = counterpart_name(name) else {
            tracing::debug!(file = name, "discarding file without .in/.out extension");
            remaining.remove(0);
            continue;
        };

        match remaining
            .iter()
            .position(|&idx| names[idx].as_ref() == wanted)
        {
            Some(position) => {
                matched.push((current, remaining[position]));
                // position is never 0: a name cannot be its own counterpart
                remaining.remove(position);
                remaining.remove(0);
            }
            None => {
                tracing::debug!(file = name, counterpart = %wanted, "discarding unmatched file");
                remaining.remove(0);
            }
        }
    }

    matched
}

/// Project complete pairs out of a flat file list.
///
/// Ordering follows the `.in` entries; each is matched with the first
/// `.out` entry sharing its pairing key.
pub fn find_pairs(files: &[FileObject]) -> Vec<Pair> {
    files
        .iter()
        .filter_map(|input| {
            let (key, kind) = classify(&input.name)?;
            if kind != CaseKind::Input {
                return None;
            }
            files
                .iter()
                .find(|candidate| classify(&candidate.name) == Some((key, CaseKind::Output)))
                .map(|output| Pair {
                    input: input.clone(),
                    output: output.clone(),
                })
        })
        .collect()
}

/// At least one complete pair exists in `files`
pub fn has_valid_pair(files: &[FileObject]) -> bool {
    files.iter().any(|input| {
        matches!(classify(&input.name), Some((key, CaseKind::Input))
            if files.iter().any(|f| classify(&f.name) == Some((key, CaseKind::Output))))
    })
}

/// Last `/`-separated segment of a URL, or `fallback` when it is empty
pub fn display_name_from_url(url: &str, fallback: &str) -> String {
    match url.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => fallback.to_string(),
    }
}
