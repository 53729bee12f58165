use anyhow::Context;

use crate::config::Config;
use crate::report::TracingReporter;
use crate::services::batch::{BatchMerger, BatchOptions, BatchSummary};

pub(super) async fn convert_archive(options: BatchOptions) -> anyhow::Result<BatchSummary> {
    let summary = tokio::task::spawn_blocking(move || {
        BatchMerger::new(options, &TracingReporter).run()
    })
    .await
    .context("Conversion task failed")??;

    Ok(summary)
}

pub async fn cmd_convert(
    config: &Config,
    source_dir: Option<String>,
    skip_malformed: bool,
) -> anyhow::Result<()> {
    let mut options = BatchOptions::from_config(config);
    if let Some(dir) = source_dir {
        options.source_dir = dir.into();
    }
    options.skip_malformed |= skip_malformed;

    let full = options.full_output.display().to_string();
    let min = options.min_output.display().to_string();
    let summary = convert_archive(options).await?;

    print_summary(&summary, &full, &min);
    Ok(())
}

pub(super) fn print_summary(summary: &BatchSummary, full: &str, min: &str) {
    println!("✓ Wrote {} records to {full} and {min}", summary.records);
    println!(
        "  UUIDs: {} reused, {} new",
        summary.reused_uuids, summary.new_uuids
    );
    if summary.skipped > 0 {
        println!("⚠ Skipped {} malformed documents", summary.skipped);
    }
}
