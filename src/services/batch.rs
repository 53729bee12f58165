//! Batch conversion of an unpacked AniDB archive.
//!
//! Every `AnimeDoc_<id>.xml` in the source directory is extracted, stable
//! UUIDs are carried over from the previous output, and the full and
//! minimized JSON files are written once the whole collection succeeded.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::domain::AnidbId;
use crate::models::MediaInfo;
use crate::parser::{is_document_candidate, parse_document_filename};
use crate::report::{ReportTarget, Status, StatusReporter};
use crate::services::extractor::{ExtractError, extract_file};
use crate::services::minify::remove_empty_keys;
use crate::services::prior::PriorIndex;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Unrecognized document file name: {0}")]
    AmbiguousFilename(PathBuf),

    #[error("Failed to extract {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("Failed to load previous output {path}: {source}")]
    PriorOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list source directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub source_dir: PathBuf,
    pub full_output: PathBuf,
    pub min_output: PathBuf,
    /// Skip documents that fail extraction instead of aborting the batch.
    pub skip_malformed: bool,
    /// Report progress every N documents.
    pub progress_interval: usize,
}

impl BatchOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_dir: PathBuf::from(&config.batch.source_dir),
            full_output: PathBuf::from(&config.output.full_path),
            min_output: PathBuf::from(&config.output.min_path),
            skip_malformed: config.batch.skip_malformed,
            progress_interval: config.batch.progress_interval,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub reused_uuids: usize,
    pub new_uuids: usize,
    pub skipped: usize,
}

/// One document found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: AnidbId,
    pub path: PathBuf,
}

pub struct BatchMerger<'a> {
    options: BatchOptions,
    reporter: &'a dyn StatusReporter,
}

impl<'a> BatchMerger<'a> {
    #[must_use]
    pub fn new(options: BatchOptions, reporter: &'a dyn StatusReporter) -> Self {
        Self { options, reporter }
    }

    /// Runs the whole batch and writes both output files.
    #[instrument(skip(self), fields(source_dir = %self.options.source_dir.display()))]
    pub fn run(&self) -> Result<BatchSummary, BatchError> {
        let start = std::time::Instant::now();
        info!(event = "batch_started", "Converting AniDB documents");

        let prior_path = &self.options.full_output;
        let prior = PriorIndex::load(prior_path).map_err(|source| BatchError::PriorOutput {
            path: prior_path.clone(),
            source,
        })?;
        debug!(known = prior.len(), "Loaded previous identifiers");

        let documents = discover_documents(&self.options.source_dir)?;
        let (mut records, summary) = self.extract_all(&documents, &prior)?;

        self.reporter
            .report(ReportTarget::Console, Status::Info, "Sorting by AniDB ID");
        sort_records(&mut records);

        self.reporter.report(
            ReportTarget::Console,
            Status::Info,
            &format!(
                "Writing {} and {}",
                self.options.full_output.display(),
                self.options.min_output.display()
            ),
        );
        write_outputs(&records, &self.options.full_output, &self.options.min_output)?;

        info!(
            event = "batch_finished",
            records = summary.records,
            reused_uuids = summary.reused_uuids,
            new_uuids = summary.new_uuids,
            skipped = summary.skipped,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Conversion complete"
        );

        Ok(summary)
    }

    fn extract_all(
        &self,
        documents: &[SourceDocument],
        prior: &PriorIndex,
    ) -> Result<(Vec<MediaInfo>, BatchSummary), BatchError> {
        let total = documents.len() as u64;
        let interval = self.options.progress_interval.max(1);
        let mut records = Vec::with_capacity(documents.len());
        let mut summary = BatchSummary::default();

        for (index, document) in documents.iter().enumerate() {
            let uuid = prior.uuid_for(document.id).map(str::to_string);
            let reused = uuid.is_some();

            match extract_file(&document.path, uuid).and_then(|r| check_source_id(document, r)) {
                Ok(record) => {
                    if reused {
                        summary.reused_uuids += 1;
                    } else {
                        summary.new_uuids += 1;
                    }
                    records.push(record);
                }
                Err(e) if self.options.skip_malformed => {
                    warn!(
                        event = "document_skipped",
                        path = %document.path.display(),
                        error = %e,
                        "Skipping document"
                    );
                    summary.skipped += 1;
                }
                Err(source) => {
                    return Err(BatchError::Extract {
                        path: document.path.clone(),
                        source,
                    });
                }
            }

            let done = index + 1;
            if done % interval == 0 || done == documents.len() {
                self.reporter
                    .progress(ReportTarget::Console, "convert", done as u64, Some(total));
            }
        }

        summary.records = records.len();
        Ok((records, summary))
    }
}

/// Rejects a record whose `<anime id>` differs from the id in its file name.
fn check_source_id(document: &SourceDocument, record: MediaInfo) -> Result<MediaInfo, ExtractError> {
    if record.mappings.anidb == document.id {
        Ok(record)
    } else {
        Err(ExtractError::MalformedDocument(format!(
            "<anime id=\"{}\"> does not match file name id {}",
            record.mappings.anidb, document.id
        )))
    }
}

/// Lists the documents of `dir`, ordered by file name.
///
/// Files without the `.xml` extension are ignored; an `.xml` file that is not
/// named `AnimeDoc_<id>.xml` is an error.
pub fn discover_documents(dir: &Path) -> Result<Vec<SourceDocument>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::SourceNotFound(dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_document_candidate(path) {
            continue;
        }

        let id = entry
            .file_name()
            .to_str()
            .and_then(parse_document_filename)
            .ok_or_else(|| BatchError::AmbiguousFilename(path.to_path_buf()))?;

        documents.push(SourceDocument {
            id,
            path: path.to_path_buf(),
        });
    }

    Ok(documents)
}

/// Orders records by ascending AniDB id.
pub fn sort_records(records: &mut [MediaInfo]) {
    records.sort_by_key(|r| r.mappings.anidb);
}

/// Writes the full records to `full` and the stripped variant to `min`.
///
/// Both documents are written to `.part` files first; the targets are only
/// replaced once both writes succeeded.
pub fn write_outputs(records: &[MediaInfo], full: &Path, min: &Path) -> Result<(), BatchError> {
    let full_value = serde_json::to_value(records)?;
    let full_bytes = serde_json::to_vec(&full_value)?;
    let min_bytes = serde_json::to_vec(&remove_empty_keys(full_value))?;

    let full_part = partial_path(full);
    let min_part = partial_path(min);

    let staged = write_file(&full_part, &full_bytes).and_then(|()| write_file(&min_part, &min_bytes));
    if let Err(e) = staged {
        std::fs::remove_file(&full_part).ok();
        std::fs::remove_file(&min_part).ok();
        return Err(e);
    }

    rename(&full_part, full)?;
    rename(&min_part, min)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BatchError> {
    let wrap = |source| BatchError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, bytes).map_err(wrap)
}

fn rename(from: &Path, to: &Path) -> Result<(), BatchError> {
    std::fs::rename(from, to).map_err(|source| BatchError::Write {
        path: to.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::RecordingReporter;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama-{label}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_doc(dir: &Path, id: u32, title: &str) {
        let xml = format!(
            r#"<anime id="{id}" restricted="false"><titles><title xml:lang="x-jat" type="main">{title}</title></titles></anime>"#
        );
        std::fs::write(dir.join(format!("AnimeDoc_{id}.xml")), xml).unwrap();
    }

    fn options(dir: &Path) -> BatchOptions {
        BatchOptions {
            source_dir: dir.join("src"),
            full_output: dir.join("anidb.json"),
            min_output: dir.join("anidb_min.json"),
            skip_malformed: false,
            progress_interval: 1,
        }
    }

    #[test]
    fn test_discover_skips_non_xml_and_sorts() {
        let dir = temp_dir("discover");
        write_doc(&dir, 20, "B");
        write_doc(&dir, 3, "A");
        std::fs::write(dir.join("readme.txt"), "x").unwrap();

        let docs = discover_documents(&dir).unwrap();
        let ids: Vec<u32> = docs.iter().map(|d| d.id.value()).collect();
        assert_eq!(ids, vec![20, 3]);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_discover_rejects_unexpected_xml() {
        let dir = temp_dir("ambiguous");
        write_doc(&dir, 1, "A");
        std::fs::write(dir.join("Character_1.xml"), "<character/>").unwrap();

        assert!(matches!(
            discover_documents(&dir),
            Err(BatchError::AmbiguousFilename(_))
        ));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_source_dir() {
        let dir = std::env::temp_dir().join(format!("diorama-none-{}", uuid::Uuid::new_v4()));
        assert!(matches!(
            discover_documents(&dir),
            Err(BatchError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_malformed_document_aborts_without_output() {
        let dir = temp_dir("abort");
        let src = dir.join("src");
        std::fs::create_dir_all(&src).unwrap();
        write_doc(&src, 1, "Fine");
        std::fs::write(src.join("AnimeDoc_2.xml"), "<anime id=\"2\"><titles>").unwrap();

        let reporter = RecordingReporter::default();
        let result = BatchMerger::new(options(&dir), &reporter).run();

        assert!(matches!(result, Err(BatchError::Extract { .. })));
        assert!(!dir.join("anidb.json").exists());
        assert!(!dir.join("anidb_min.json").exists());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_skip_policy_keeps_good_documents() {
        let dir = temp_dir("skip");
        let src = dir.join("src");
        std::fs::create_dir_all(&src).unwrap();
        write_doc(&src, 1, "Fine");
        std::fs::write(src.join("AnimeDoc_2.xml"), "<anime id=\"2\"></anime>").unwrap();

        let reporter = RecordingReporter::default();
        let mut opts = options(&dir);
        opts.skip_malformed = true;
        let summary = BatchMerger::new(opts, &reporter).run().unwrap();

        assert_eq!(summary.records, 1);
        assert_eq!(summary.skipped, 1);
        assert!(dir.join("anidb.json").exists());
        assert_eq!(reporter.progress.lock().unwrap().len(), 2);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_file_name_id_must_match_anime_id() {
        let dir = temp_dir("mismatch");
        let src = dir.join("src");
        std::fs::create_dir_all(&src).unwrap();
        write_doc(&src, 1, "Fine");
        std::fs::write(
            src.join("AnimeDoc_5.xml"),
            r#"<anime id="6"><titles><title type="main">Elsewhere</title></titles></anime>"#,
        )
        .unwrap();

        let reporter = RecordingReporter::default();
        let result = BatchMerger::new(options(&dir), &reporter).run();
        assert!(matches!(
            result,
            Err(BatchError::Extract {
                source: ExtractError::MalformedDocument(_),
                ..
            })
        ));
        assert!(!dir.join("anidb.json").exists());

        let mut opts = options(&dir);
        opts.skip_malformed = true;
        let summary = BatchMerger::new(opts, &reporter).run().unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.skipped, 1);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_failed_min_write_keeps_previous_full_output() {
        let dir = temp_dir("staged");
        let full = dir.join("anidb.json");
        std::fs::write(&full, "old").unwrap();
        std::fs::write(dir.join("blocker"), "not a directory").unwrap();
        let min = dir.join("blocker").join("anidb_min.json");

        let record = crate::services::extractor::extract_record(
            r#"<anime id="3"><titles><title type="main">New</title></titles></anime>"#,
            None,
        )
        .unwrap();

        assert!(matches!(
            write_outputs(&[record], &full, &min),
            Err(BatchError::Write { .. })
        ));
        assert_eq!(std::fs::read_to_string(&full).unwrap(), "old");
        assert!(!partial_path(&full).exists());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_write_outputs_leaves_no_partial_files() {
        let dir = temp_dir("write");
        let full = dir.join("out").join("anidb.json");
        let min = dir.join("out").join("anidb_min.json");

        write_outputs(&[], &full, &min).unwrap();

        assert_eq!(std::fs::read_to_string(&full).unwrap(), "[]");
        assert_eq!(std::fs::read_to_string(&min).unwrap(), "[]");
        assert!(!partial_path(&full).exists());
        assert!(!partial_path(&min).exists());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_outputs_keep_non_ascii_literal() {
        let dir = temp_dir("ascii");
        let src = dir.join("src");
        std::fs::create_dir_all(&src).unwrap();
        write_doc(&src, 9, "星界の紋章");

        let reporter = RecordingReporter::default();
        BatchMerger::new(options(&dir), &reporter).run().unwrap();

        let full = std::fs::read_to_string(dir.join("anidb.json")).unwrap();
        assert!(full.contains("星界の紋章"));
        assert!(!full.contains("\\u"));
        std::fs::remove_dir_all(dir).ok();
    }
}
