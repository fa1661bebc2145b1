mod path;


pub use path::{EntryName, NameSanitizer, SkipReason};
