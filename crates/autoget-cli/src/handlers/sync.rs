//! One-shot progress and finalization pass.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Run one progress sync for the selected downloaders.
///
/// Every downloader is attempted; the first failure is returned afterwards.
pub async fn execute(ctx: &CliContext, downloader: Option<&str>) -> Result<()> {
    let mut first_error: Option<CliError> = None;

    for reconciler in ctx.select(downloader)? {
        match reconciler.run_progress_sync().await {
            Ok(report) => {
                println!(
                    "{}: {} updated, {} now seeding, {} finalized, {} failed{}",
                    reconciler.name(),
                    report.progress_updated,
                    report.advanced_to_seeding,
                    report.finalized,
                    report.failed,
                    if report.finalization_skipped {
                        " (finalization skipped)"
                    } else {
                        ""
                    }
                );
            }
            Err(e) => {
                eprintln!("{}: {e}", reconciler.name());
                first_error.get_or_insert(e.into());
            }
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}
