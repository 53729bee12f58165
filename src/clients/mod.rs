pub mod archive;

pub use archive::{ArchiveError, ArchiveFetcher};
