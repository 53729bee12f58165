use std::path::PathBuf;

use anyhow::Context;

use crate::clients::archive;
use crate::config::Config;
use crate::report::TracingReporter;

pub(super) async fn unpack_archive(config: &Config) -> anyhow::Result<usize> {
    let archive_path = PathBuf::from(&config.archive.archive_path);
    let dest = PathBuf::from(&config.archive.extract_dir);

    let entries = tokio::task::spawn_blocking(move || {
        archive::unpack(&archive_path, &dest, &TracingReporter)
    })
    .await
    .context("Unpack task failed")?
    .with_context(|| format!("Failed to unzip {}", config.archive.archive_path))?;

    Ok(entries)
}

pub async fn cmd_unpack(config: &Config) -> anyhow::Result<()> {
    let entries = unpack_archive(config).await?;
    println!(
        "✓ Unpacked {entries} entries into {}",
        config.archive.extract_dir
    );
    Ok(())
}
