// Public API exports
pub mod batch;
pub mod blob;
pub mod bundle;
pub mod intake;
pub mod pairing;
pub mod security;
pub mod view;

// Re-export main types for convenience
pub use intake::{
    AcceptancePolicy, DropOutcome, DroppedFile, FileObject, InitState, Intake, IntakeError,
    IntakeMode, IntakeNotifier, IntakeOptions, Pair, RecordingNotifier,
};
pub use security::{EntryName, NameSanitizer, SkipReason};

pub use batch::BatchBuilder;
pub use blob::{BlobEntry, BlobStore};
pub use bundle::{BundleReader, BundleWriter, Manifest};
pub use view::render;
