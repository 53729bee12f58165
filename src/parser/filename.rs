use crate::domain::AnidbId;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// File extension of the per-title documents in the AniDB archive.
pub const DOCUMENT_EXTENSION: &str = "xml";

fn document_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^AnimeDoc_(?P<id>\d+)\.xml$").expect("Invalid regex pattern defined in code")
    })
}

/// Returns true for any file carrying the document extension, matching or not.
#[must_use]
pub fn is_document_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

/// Extracts the AniDB id from an `AnimeDoc_<id>.xml` file name.
#[must_use]
pub fn parse_document_filename(filename: &str) -> Option<AnidbId> {
    let caps = document_regex().captures(filename)?;
    caps.name("id")?.as_str().parse().ok()
}
