use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::clients::archive::ArchiveFetcher;
use crate::config::Config;
use crate::report::TracingReporter;

pub(super) async fn fetch_archive(config: &Config) -> anyhow::Result<u64> {
    let fetcher = ArchiveFetcher::new(
        config.archive.url.as_str(),
        &config.archive.user_agent,
        Duration::from_secs(config.archive.connect_timeout_seconds),
    )
    .context("Failed to build HTTP client")?;

    let dest = Path::new(&config.archive.archive_path);
    let bytes = fetcher
        .fetch(dest, &TracingReporter)
        .await
        .with_context(|| format!("Failed to download {}", fetcher.url()))?;
    Ok(bytes)
}

pub async fn cmd_fetch(config: &Config) -> anyhow::Result<()> {
    let bytes = fetch_archive(config).await?;
    println!(
        "✓ Downloaded {} ({:.1} MiB)",
        config.archive.archive_path,
        bytes as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}
