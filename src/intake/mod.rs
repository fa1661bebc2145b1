mod entry;
mod error;
mod notifier;

pub use entry::{DroppedFile, FileObject, Pair, LOCAL_SCHEME};
pub use error::IntakeError;
pub use notifier::{IntakeNotifier, RecordingNotifier};

use crate::blob::BlobStore;
use crate::pairing::{self, FILE_FALLBACK_NAME, PDF_FALLBACK_NAME};
use serde::{Deserialize, Serialize};


/// Which intake algorithm a drop surface runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntakeMode {
    /// Single problem statement; every drop replaces the previous file
    Pdf,
    /// Paired `.in`/`.out` test cases; drops accumulate
    InOut,
}

impl IntakeMode {
    /// Accept filter applied to a batch before the mode algorithm runs
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            IntakeMode::Pdf => pairing::split_name(name).1.eq_ignore_ascii_case("pdf"),
            IntakeMode::InOut => true,
        }
    }
}

/// How "file uploaded" is recomputed after a drop or a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptancePolicy {
    /// Drop: only the newly added batch is inspected.
    /// Delete: the list held more than two files before the deletion.
    LatestBatch,
    /// Both: at least one complete pair exists in the whole list.
    #[default]
    FullScan,
}

/// Configuration handed to an intake on mount
#[derive(Debug, Clone)]
pub struct IntakeOptions {
    pub mode: IntakeMode,
    /// Display-only prompt text
    pub guide_message: String,
    pub initial_pdf_url: Option<String>,
    pub initial_in_out_urls: Vec<String>,
    pub policy: AcceptancePolicy,
}

impl IntakeOptions {
    pub fn new(mode: IntakeMode) -> Self {
        Self {
            mode,
            guide_message: String::new(),
            initial_pdf_url: None,
            initial_in_out_urls: Vec::new(),
            policy: AcceptancePolicy::default(),
        }
    }

    pub fn guide_message(mut self, message: impl Into<String>) -> Self {
        self.guide_message = message.into();
        self
    }

    pub fn initial_pdf_url(mut self, url: impl Into<String>) -> Self {
        self.initial_pdf_url = Some(url.into());
        self
    }

    pub fn initial_in_out_urls(mut self, urls: Vec<String>) -> Self {
        self.initial_in_out_urls = urls;
        self
    }

    pub fn policy(mut self, policy: AcceptancePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One-shot hydration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Hydrated,
}

/// What a single drop did to the working set
#[derive(Debug, Clone, Default)]
pub struct DropOutcome {
    /// Files added to the working set, in list order
    pub accepted: Vec<FileObject>,
    /// Names that were filtered out or left unmatched
    pub discarded: Vec<String>,
}

/// Drop surface state for one mounted intake.
///
/// `file_list` is canonical; `file_names` and `file_urls` are projections
/// rebuilt or extended alongside it on every mutation.
#[derive(Debug)]
pub struct Intake<N> {
    options: IntakeOptions,
    notifier: N,
    init: InitState,
    file_list: Vec<FileObject>,
    file_names: Vec<String>,
    file_urls: Vec<String>,
    uploaded: bool,
    blobs: BlobStore,
}

impl<N: IntakeNotifier> Intake<N> {
    /// Create an intake and run hydration once
    pub fn mount(options: IntakeOptions, notifier: N) -> Self {
        let mut intake = Self {
            options,
            notifier,
            init: InitState::Uninitialized,
            file_list: Vec::new(),
            file_names: Vec::new(),
            file_urls: Vec::new(),
            uploaded: false,
            blobs: BlobStore::new(),
        };
        intake.hydrate();
        intake
    }

    /// Seed state from the initial URLs. Does nothing once hydrated.
    pub fn hydrate(&mut self) {
        if self.init == InitState::Hydrated {
            return;
        }

        match self.options.mode {
            IntakeMode::Pdf => {
                if let Some(url) = self.options.initial_pdf_url.clone().filter(|u| !u.is_empty()) {
                    let name = pairing::display_name_from_url(&url, PDF_FALLBACK_NAME);
                    tracing::info!(file = %name, url = %url, "hydrated pdf intake");
                    self.replace_all(vec![FileObject::new(name, url)]);
                    self.set_uploaded(true);
                }
            }
            IntakeMode::InOut => {
                if !self.options.initial_in_out_urls.is_empty() {
                    let files: Vec<FileObject> = self
                        .options
                        .initial_in_out_urls
                        .iter()
                        .map(|url| {
                            FileObject::new(
                                pairing::display_name_from_url(url, FILE_FALLBACK_NAME),
                                url.clone(),
                            )
                        })
                        .collect();
                    tracing::info!(count = files.len(), "hydrated in/out intake");
                    self.replace_all(files);
                    self.set_uploaded(true);
                }
            }
        }

        self.init = InitState::Hydrated;
    }

    /// Handle one drop or browse interaction
    pub fn on_drop(&mut self, batch: Vec<DroppedFile>) -> DropOutcome {
        let mode = self.options.mode;
        let (batch, rejected): (Vec<DroppedFile>, Vec<DroppedFile>) =
            batch.into_iter().partition(|file| mode.accepts(&file.name));
        let mut discarded: Vec<String> = rejected.into_iter().map(|file| file.name).collect();

        let accepted = match mode {
            IntakeMode::Pdf => self.drop_pdf(batch, &mut discarded),
            IntakeMode::InOut => self.drop_in_out(batch, &mut discarded),
        };

        DropOutcome {
            accepted,
            discarded,
        }
    }

    fn drop_pdf(&mut self, batch: Vec<DroppedFile>, discarded: &mut Vec<String>) -> Vec<FileObject> {
        let mut files = batch.into_iter();
        let Some(first) = files.next() else {
            return Vec::new();
        };
        discarded.extend(files.map(|file| file.name));

        for url in &self.file_urls {
            self.blobs.revoke(url);
        }

        let url = self.blobs.create(&first);
        let file = FileObject::new(first.name, url.clone());
        tracing::info!(file = %file.name, "accepted pdf");

        self.replace_all(vec![file.clone()]);
        self.set_uploaded(true);
        self.notifier.set_pdf_url(&url);

        vec![file]
    }

    fn drop_in_out(
        &mut self,
        batch: Vec<DroppedFile>,
        discarded: &mut Vec<String>,
    ) -> Vec<FileObject> {
        let matches = pairing::match_batch(&batch.iter().map(|f| f.name.as_str()).collect::<Vec<_>>());

        let mut used = vec![false; batch.len()];
        let mut added = Vec::with_capacity(matches.len() * 2);
        for (current, counterpart) in matches {
            for idx in [current, counterpart] {
                used[idx] = true;
                let url = self.blobs.create(&batch[idx]);
                added.push(FileObject::new(batch[idx].name.clone(), url));
            }
        }
        discarded.extend(
            batch
                .into_iter()
                .zip(used)
                .filter(|(_, used)| !used)
                .map(|(file, _)| file.name),
        );

        tracing::info!(
            pairs = added.len() / 2,
            discarded = discarded.len(),
            "accepted in/out batch"
        );

        self.file_names.extend(added.iter().map(|f| f.name.clone()));
        self.file_urls.extend(added.iter().map(|f| f.url.clone()));
        self.file_list.extend(added.iter().cloned());

        let new_urls: Vec<String> = added.iter().map(|f| f.url.clone()).collect();
        self.notifier.set_in_out_urls(&new_urls);

        let has_pair = match self.options.policy {
            AcceptancePolicy::LatestBatch => pairing::has_valid_pair(&added),
            AcceptancePolicy::FullScan => pairing::has_valid_pair(&self.file_list),
        };
        self.set_uploaded(has_pair);

        added
    }

    /// Remove both files of `pair` (matched by URL) and resync.
    ///
    /// Returns false when neither file was in the working set; in that case
    /// nothing changed and no notification is sent.
    pub fn delete_pair(&mut self, pair: &Pair) -> bool {
        let before = self.file_list.len();
        self.file_list
            .retain(|file| file.url != pair.input.url && file.url != pair.output.url);
        if self.file_list.len() == before {
            return false;
        }

        self.blobs.revoke(&pair.input.url);
        self.blobs.revoke(&pair.output.url);
        self.file_names = self.file_list.iter().map(|f| f.name.clone()).collect();
        self.file_urls = self.file_list.iter().map(|f| f.url.clone()).collect();
        tracing::info!(
            input = %pair.input.name,
            output = %pair.output.name,
            remaining = self.file_list.len(),
            "deleted pair"
        );

        self.notifier.set_in_out_urls(&self.file_urls);

        let still_uploaded = match self.options.policy {
            AcceptancePolicy::LatestBatch => before > 2,
            AcceptancePolicy::FullScan => pairing::has_valid_pair(&self.file_list),
        };
        self.set_uploaded(still_uploaded);

        true
    }

    fn replace_all(&mut self, files: Vec<FileObject>) {
        self.file_names = files.iter().map(|f| f.name.clone()).collect();
        self.file_urls = files.iter().map(|f| f.url.clone()).collect();
        self.file_list = files;
    }

    fn set_uploaded(&mut self, uploaded: bool) {
        self.uploaded = uploaded;
        self.notifier.set_uploaded(uploaded);
    }
}

impl<N> Intake<N> {
    /// Unmount: release every local reference this intake minted
    pub fn teardown(mut self) -> usize {
        self.release()
    }

    fn release(&mut self) -> usize {
        let released = self.blobs.revoke_all();
        if released > 0 {
            tracing::debug!(released, "released local references");
        }
        released
    }

    /// Complete pairs in the working set, ordered by their `.in` entries
    pub fn in_and_out_pairs(&self) -> Vec<Pair> {
        pairing::find_pairs(&self.file_list)
    }

    /// Contents behind a local reference still held by this intake
    pub fn read(&self, url: &str) -> Option<&[u8]> {
        self.blobs.get(url)
    }

    /// Hex SHA-256 of a local reference's contents
    pub fn digest(&self, url: &str) -> Option<&str> {
        self.blobs.get_entry(url).map(|entry| entry.digest.as_str())
    }

    pub fn file_list(&self) -> &[FileObject] {
        &self.file_list
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn file_urls(&self) -> &[String] {
        &self.file_urls
    }

    pub fn is_file_uploaded(&self) -> bool {
        self.uploaded
    }

    pub fn init_state(&self) -> InitState {
        self.init
    }

    pub fn mode(&self) -> IntakeMode {
        self.options.mode
    }

    pub fn guide_message(&self) -> &str {
        &self.options.guide_message
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Number of local references still alive
    pub fn live_references(&self) -> usize {
        self.blobs.len()
    }
}

impl<N> Drop for Intake<N> {
    fn drop(&mut self) {
        self.release();
    }
}
