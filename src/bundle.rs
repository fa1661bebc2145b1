use anyhow::{bail, Context, Result};
use chrono::{Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::intake::{DroppedFile, FileObject, Intake, IntakeMode, IntakeNotifier, IntakeOptions};

const MANIFEST_NAME: &str = "manifest.json";
const FILES_DIR: &str = "files/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: String,
    pub generator: String,
    pub mode: IntakeMode,
    pub guide_message: String,
    pub uploaded: bool,
    pub files: Vec<ManifestFile>,
    pub pairs: Vec<ManifestPair>,
    pub stats: ManifestStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    pub url: String,
    /// Entry path inside the bundle; `None` for remote files
    pub archived_as: Option<String>,
    pub sha256: Option<String>,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestPair {
    #[serde(rename = "in")]
    pub input: String,
    #[serde(rename = "out")]
    pub output: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestStats {
    pub file_count: u32,
    pub pair_count: u32,
    pub local_count: u32,
    pub remote_count: u32,
    pub total_size_bytes: u64,
}

impl Manifest {
    /// URLs that stay valid outside the intake that produced them
    pub fn remote_urls(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|file| file.archived_as.is_none())
            .map(|file| file.url.clone())
            .collect()
    }
}

/// Writes the staged contents of an intake into a ZIP bundle
pub struct BundleWriter;

impl BundleWriter {
    /// Snapshot `intake` into a manifest without writing anything
    pub fn manifest<N>(intake: &Intake<N>) -> Manifest {
        let mut stats = ManifestStats::default();
        let files: Vec<ManifestFile> = intake
            .file_list()
            .iter()
            .enumerate()
            .map(|(idx, file)| {
                let bytes = intake.read(&file.url);
                stats.file_count += 1;
                match bytes {
                    Some(bytes) => {
                        stats.local_count += 1;
                        stats.total_size_bytes += bytes.len() as u64;
                        ManifestFile {
                            name: file.name.clone(),
                            url: file.url.clone(),
                            archived_as: Some(archive_path(idx, file)),
                            sha256: intake.digest(&file.url).map(str::to_string),
                            size_bytes: Some(bytes.len() as u64),
                        }
                    }
                    None => {
                        stats.remote_count += 1;
                        ManifestFile {
                            name: file.name.clone(),
                            url: file.url.clone(),
                            archived_as: None,
                            sha256: None,
                            size_bytes: None,
                        }
                    }
                }
            })
            .collect();

        let pairs: Vec<ManifestPair> = match intake.mode() {
            IntakeMode::Pdf => Vec::new(),
            IntakeMode::InOut => intake
                .in_and_out_pairs()
                .into_iter()
                .map(|pair| ManifestPair {
                    input: pair.input.name,
                    output: pair.output.name,
                })
                .collect(),
        };
        stats.pair_count = pairs.len() as u32;

        Manifest {
            version: "1.0.0".to_string(),
            created_at: Utc::now().to_rfc3339(),
            generator: format!("judge-intake v{}", env!("CARGO_PKG_VERSION")),
            mode: intake.mode(),
            guide_message: intake.guide_message().to_string(),
            uploaded: intake.is_file_uploaded(),
            files,
            pairs,
            stats,
        }
    }

    /// Write bundle to file
    pub fn write<N>(intake: &Intake<N>, output_path: &str) -> Result<Manifest> {
        tracing::info!(path = output_path, "writing bundle");

        let manifest = Self::manifest(intake);

        let file = File::create(output_path)
            .context(format!("Failed to create output file: {}", output_path))?;
        let mut zip = ZipWriter::new(file);
        let now = chrono::Local::now();
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644)
            .last_modified_time(
                zip::DateTime::from_date_and_time(
                    now.year() as u16,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )
                .unwrap_or_default(),
            );

        zip.add_directory(FILES_DIR, options)
            .context("Failed to create files directory")?;

        for entry in &manifest.files {
            let Some(archived_as) = &entry.archived_as else {
                continue;
            };
            let bytes = intake
                .read(&entry.url)
                .context(format!("Local reference vanished: {}", entry.url))?;
            zip.start_file(archived_as.as_str(), options)
                .context(format!("Failed to start {} in ZIP", archived_as))?;
            zip.write_all(bytes)
                .context(format!("Failed to write {} to ZIP", archived_as))?;
        }

        zip.start_file(MANIFEST_NAME, options)
            .context("Failed to start manifest file in ZIP")?;
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        zip.write_all(manifest_json.as_bytes())
            .context("Failed to write manifest to ZIP")?;

        zip.finish().context("Failed to finalize ZIP file")?;

        tracing::info!(
            files = manifest.stats.file_count,
            pairs = manifest.stats.pair_count,
            remote = manifest.stats.remote_count,
            "bundle written"
        );

        Ok(manifest)
    }
}

/// Reads a bundle written by [`BundleWriter`]
pub struct BundleReader {
    archive: ZipArchive<File>,
    pub manifest: Manifest,
}

impl BundleReader {
    pub fn open(bundle_path: &str) -> Result<Self> {
        tracing::debug!(path = bundle_path, "opening bundle");

        let file = File::open(bundle_path)
            .context(format!("Failed to open bundle: {}", bundle_path))?;
        let mut archive = ZipArchive::new(file).context("Failed to read ZIP archive")?;

        let mut manifest_file = archive
            .by_name(MANIFEST_NAME)
            .context("manifest.json not found in bundle")?;
        let mut manifest_contents = String::new();
        manifest_file
            .read_to_string(&mut manifest_contents)
            .context("Failed to read manifest")?;
        let manifest: Manifest =
            serde_json::from_str(&manifest_contents).context("Failed to parse manifest.json")?;
        drop(manifest_file);

        Ok(Self { archive, manifest })
    }

    /// Mount a new intake from this bundle.
    ///
    /// Remote files are appended to the hydration URLs in `options`; archived
    /// local files are then dropped again as one batch.
    pub fn restore<N: IntakeNotifier>(
        &mut self,
        options: IntakeOptions,
        notifier: N,
    ) -> Result<Intake<N>> {
        if options.mode != self.manifest.mode {
            bail!(
                "Bundle was staged in {:?} mode, not {:?}",
                self.manifest.mode,
                options.mode
            );
        }

        let remote = self.manifest.remote_urls();
        let options = match options.mode {
            IntakeMode::Pdf => match remote.into_iter().next() {
                Some(url) if options.initial_pdf_url.is_none() => options.initial_pdf_url(url),
                _ => options,
            },
            IntakeMode::InOut => {
                let mut urls = options.initial_in_out_urls.clone();
                urls.extend(remote);
                options.initial_in_out_urls(urls)
            }
        };

        let batch = self.dropped_files()?;
        let mut intake = Intake::mount(options, notifier);
        if !batch.is_empty() {
            intake.on_drop(batch);
        }

        tracing::info!(files = intake.file_list().len(), "restored bundle");
        Ok(intake)
    }

    /// Archived local files as a fresh batch, in manifest order
    pub fn dropped_files(&mut self) -> Result<Vec<DroppedFile>> {
        let mut batch = Vec::new();
        for entry in &self.manifest.files {
            let Some(archived_as) = &entry.archived_as else {
                continue;
            };
            let mut file = self
                .archive
                .by_name(archived_as)
                .context(format!("{} not found in bundle", archived_as))?;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .context(format!("Failed to read {} from bundle", archived_as))?;
            batch.push(DroppedFile::new(entry.name.clone(), bytes));
        }
        Ok(batch)
    }
}

fn archive_path(idx: usize, file: &FileObject) -> String {
    format!("{}{:04}_{}", FILES_DIR, idx, file.name)
}
