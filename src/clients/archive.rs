//! AniDB archive download and unpacking.
//!
//! The Shoko mirror publishes every AniDB anime document as one ZIP file.
//!
//! # Architecture
//!
//! 1. **Download** (async): streams the archive to a `.part` file, renamed on success
//! 2. **Unpack** (blocking): extracts every entry below the destination directory

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::report::{ReportTarget, Status, StatusReporter};

/// Bytes between two download progress reports.
const DOWNLOAD_REPORT_BYTES: u64 = 8 * 1024 * 1024;

/// Entries between two unpack progress reports.
const UNPACK_REPORT_ENTRIES: usize = 500;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a valid ZIP file or it is corrupted: {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry escapes the destination directory: {0}")]
    UnsafeEntry(String),
}

impl ArchiveError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
    url: String,
}

impl ArchiveFetcher {
    pub fn new(
        url: impl Into<String>,
        user_agent: &str,
        connect_timeout: Duration,
    ) -> Result<Self, ArchiveError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the archive to `dest` and returns the number of bytes written.
    #[instrument(skip(self, reporter), fields(url = %self.url))]
    pub async fn fetch(
        &self,
        dest: &Path,
        reporter: &dyn StatusReporter,
    ) -> Result<u64, ArchiveError> {
        let start = std::time::Instant::now();
        reporter.report(
            ReportTarget::Console,
            Status::Info,
            &format!("Downloading {}", self.url),
        );

        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let total = response.content_length();

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArchiveError::io(parent, e))?;
        }

        let partial = partial_path(dest);
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|e| ArchiveError::io(&partial, e))?;

        let mut written = 0u64;
        let mut next_report = DOWNLOAD_REPORT_BYTES;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ArchiveError::io(&partial, e))?;
            written += chunk.len() as u64;

            if written >= next_report {
                reporter.progress(ReportTarget::Console, "download", written, total);
                next_report += DOWNLOAD_REPORT_BYTES;
            }
        }

        file.flush()
            .await
            .map_err(|e| ArchiveError::io(&partial, e))?;
        drop(file);

        tokio::fs::rename(&partial, dest)
            .await
            .map_err(|e| ArchiveError::io(dest, e))?;

        reporter.progress(ReportTarget::Console, "download", written, total);
        reporter.report(
            ReportTarget::Console,
            Status::Pass,
            &format!("Downloaded {}", dest.display()),
        );
        info!(
            event = "archive_download_finished",
            bytes = written,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Archive downloaded"
        );

        Ok(written)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Extracts every entry of `archive` below `dest` and returns the entry count.
///
/// Status messages go to [`ReportTarget::System`].
pub fn unpack(
    archive: &Path,
    dest: &Path,
    reporter: &dyn StatusReporter,
) -> Result<usize, ArchiveError> {
    let target = ReportTarget::System;
    let start = std::time::Instant::now();
    reporter.report(
        target,
        Status::Info,
        &format!("Unzipping {}", archive.display()),
    );

    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let corrupt = |source| ArchiveError::Corrupt {
        path: archive.to_path_buf(),
        source,
    };
    let mut zip = zip::ZipArchive::new(file).map_err(corrupt)?;
    let total = zip.len();

    std::fs::create_dir_all(dest).map_err(|e| ArchiveError::io(dest, e))?;

    for index in 0..total {
        let mut entry = zip.by_index(index).map_err(corrupt)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
            }
            let mut out = File::create(&out_path).map_err(|e| ArchiveError::io(&out_path, e))?;
            std::io::copy(&mut entry, &mut out).map_err(|e| ArchiveError::io(&out_path, e))?;
        }

        let done = index + 1;
        if done % UNPACK_REPORT_ENTRIES == 0 || done == total {
            reporter.progress(target, "unpack", done as u64, Some(total as u64));
        }
    }

    reporter.report(
        target,
        Status::Pass,
        &format!("Unzipped {}", archive.display()),
    );
    debug!(
        entries = total,
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Archive unpacked"
    );

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::RecordingReporter;
    use std::io::Write;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("diorama-{label}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn build_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_unpack_extracts_entries() {
        let dir = temp_dir("unpack");
        let archive = dir.join("Anime_HTTP.zip");
        build_zip(
            &archive,
            &[
                ("Anime_HTTP/AnimeDoc_1.xml", "<anime id=\"1\"/>"),
                ("Anime_HTTP/AnimeDoc_2.xml", "<anime id=\"2\"/>"),
            ],
        );

        let reporter = RecordingReporter::default();
        let count = unpack(&archive, &dir, &reporter).unwrap();

        assert_eq!(count, 2);
        let content = std::fs::read_to_string(dir.join("Anime_HTTP/AnimeDoc_2.xml")).unwrap();
        assert_eq!(content, "<anime id=\"2\"/>");

        let messages = reporter.messages.lock().unwrap();
        assert!(messages.iter().all(|(t, _, _)| *t == ReportTarget::System));
        assert_eq!(messages.last().unwrap().1, Status::Pass);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unpack_rejects_corrupt_archive() {
        let dir = temp_dir("corrupt");
        let archive = dir.join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let reporter = RecordingReporter::default();
        assert!(matches!(
            unpack(&archive, &dir, &reporter),
            Err(ArchiveError::Corrupt { .. })
        ));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unpack_missing_archive() {
        let dir = temp_dir("missing");
        let reporter = RecordingReporter::default();
        assert!(matches!(
            unpack(&dir.join("nope.zip"), &dir, &reporter),
            Err(ArchiveError::Io { .. })
        ));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("data/Anime_HTTP.zip")),
            PathBuf::from("data/Anime_HTTP.zip.part")
        );
    }
}
