use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use judge_intake::{
    pairing, render, AcceptancePolicy, BatchBuilder, BundleReader, BundleWriter, Intake,
    IntakeMode, IntakeNotifier, IntakeOptions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "judge-intake", version, about = "Stage problem statements and .in/.out test cases")]
struct Cli {
    /// Print the final state as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stage a single PDF problem statement
    Pdf {
        /// Files, directories or ZIP archives, delivered together as one drop
        paths: Vec<PathBuf>,

        /// Already-uploaded statement URL to start from
        #[arg(long)]
        initial_url: Option<String>,

        /// Start from a previously written bundle
        #[arg(long)]
        from_bundle: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Stage paired .in/.out test cases
    InOut {
        /// Files, directories or ZIP archives, delivered together as one drop
        paths: Vec<PathBuf>,

        /// Already-uploaded test case URLs to start from (repeatable)
        #[arg(long = "initial-url")]
        initial_urls: Vec<String>,

        /// Start from a previously written bundle: its remote files are
        /// hydrated and its archived files dropped again
        #[arg(long)]
        from_bundle: Option<String>,

        /// Delete the first pair with this pairing key after all drops (repeatable)
        #[arg(long = "delete")]
        delete: Vec<String>,

        /// How acceptance is recomputed after drops and deletions
        #[arg(long, value_enum, default_value_t = AcceptancePolicy::FullScan)]
        policy: AcceptancePolicy,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show the manifest of a bundle
    Inspect {
        bundle: String,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Prompt shown above the drop surface
    #[arg(long, default_value = "Drop files here")]
    guide: String,

    /// Maximum size of a single file, in bytes
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    max_file_size: u64,

    /// Maximum size of one drop, in bytes
    #[arg(long, default_value_t = 512 * 1024 * 1024)]
    max_batch_size: u64,

    /// Write the staged files and a manifest to this ZIP
    #[arg(long)]
    bundle: Option<String>,
}

/// Forwards intake notifications to the log
struct LogNotifier;

impl IntakeNotifier for LogNotifier {
    fn set_uploaded(&mut self, uploaded: bool) {
        tracing::info!(uploaded, "upload status");
    }

    fn set_pdf_url(&mut self, url: &str) {
        tracing::info!(url, "pdf reference");
    }

    fn set_in_out_urls(&mut self, urls: &[String]) {
        tracing::info!(count = urls.len(), "in/out references");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pdf {
            paths,
            initial_url,
            from_bundle,
            common,
        } => {
            let mut options = IntakeOptions::new(IntakeMode::Pdf).guide_message(&common.guide);
            if let Some(url) = initial_url {
                options = options.initial_pdf_url(url);
            }
            let mut intake = mount(options, from_bundle.as_deref())?;
            drop_paths(&mut intake, &paths, &common)?;
            finish(intake, &common, cli.json)
        }
        Command::InOut {
            paths,
            initial_urls,
            from_bundle,
            delete,
            policy,
            common,
        } => {
            let options = IntakeOptions::new(IntakeMode::InOut)
                .guide_message(&common.guide)
                .initial_in_out_urls(initial_urls)
                .policy(policy);
            let mut intake = mount(options, from_bundle.as_deref())?;
            drop_paths(&mut intake, &paths, &common)?;

            for key in &delete {
                let pair = intake
                    .in_and_out_pairs()
                    .into_iter()
                    .find(|pair| pairing::pairing_key(&pair.input.name) == Some(key.as_str()));
                match pair {
                    Some(pair) => {
                        intake.delete_pair(&pair);
                    }
                    None => bail!("No staged pair with key '{}'", key),
                }
            }

            finish(intake, &common, cli.json)
        }
        Command::Inspect { bundle } => {
            let reader = BundleReader::open(&bundle)?;
            let json = serde_json::to_string_pretty(&reader.manifest)
                .context("Failed to serialize manifest")?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn mount(options: IntakeOptions, from_bundle: Option<&str>) -> Result<Intake<LogNotifier>> {
    match from_bundle {
        Some(bundle) => BundleReader::open(bundle)?.restore(options, LogNotifier),
        None => Ok(Intake::mount(options, LogNotifier)),
    }
}

/// Deliver every path as a single batch, like one multi-select in a file picker
fn drop_paths(
    intake: &mut Intake<LogNotifier>,
    paths: &[PathBuf],
    common: &CommonArgs,
) -> Result<()> {
    if paths.is_empty() {
        return Ok(());
    }

    let batch = BatchBuilder::new()
        .max_file_size(common.max_file_size)
        .max_total_size(common.max_batch_size)
        .add_paths(paths)
        .context("Failed to load dropped files")?
        .build();

    let outcome = intake.on_drop(batch);
    for name in &outcome.discarded {
        tracing::debug!(file = %name, "not staged");
    }
    Ok(())
}

fn finish(intake: Intake<LogNotifier>, common: &CommonArgs, json: bool) -> Result<()> {
    if let Some(bundle) = &common.bundle {
        BundleWriter::write(&intake, bundle)?;
    }

    if json {
        let summary = serde_json::json!({
            "mode": intake.mode(),
            "uploaded": intake.is_file_uploaded(),
            "files": intake.file_list(),
            "pairs": intake.in_and_out_pairs(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print!("{}", render(&intake));
    }

    intake.teardown();
    Ok(())
}
