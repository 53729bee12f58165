use std::time::Instant;

use tracing::{error, info};

use super::convert::{convert_archive, print_summary};
use super::fetch::fetch_archive;
use super::unpack::unpack_archive;
use crate::config::Config;
use crate::services::batch::{BatchOptions, BatchSummary};

async fn pipeline(config: &Config, options: BatchOptions) -> anyhow::Result<BatchSummary> {
    fetch_archive(config).await?;
    unpack_archive(config).await?;
    convert_archive(options).await
}

/// Fetch, unpack and convert in one go.
pub async fn cmd_run(config: &Config) -> anyhow::Result<()> {
    let start = Instant::now();
    let options = BatchOptions::from_config(config);
    let full = options.full_output.display().to_string();
    let min = options.min_output.display().to_string();

    let result = pipeline(config, options).await;

    let elapsed = start.elapsed();
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(summary) => {
            info!(
                event = "run_finished",
                records = summary.records,
                duration_ms,
                "Done in {:.2}s",
                elapsed.as_secs_f64()
            );
            print_summary(&summary, &full, &min);
            Ok(())
        }
        Err(e) => {
            error!(
                event = "run_failed",
                error = %e,
                duration_ms,
                "Failed after {:.2}s",
                elapsed.as_secs_f64()
            );
            Err(e)
        }
    }
}
