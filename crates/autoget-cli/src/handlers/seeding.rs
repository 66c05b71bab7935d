//! One-shot seeding policy pass.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Run one seeding policy pass for the selected downloaders.
pub async fn execute(ctx: &CliContext, downloader: Option<&str>) -> Result<()> {
    let mut first_error: Option<CliError> = None;

    for reconciler in ctx.select(downloader)? {
        if reconciler.config().seeding_policy.is_none() {
            println!("{}: no seeding policy configured", reconciler.name());
            continue;
        }

        match reconciler.run_seeding_policy().await {
            Ok(report) => {
                println!(
                    "{}: {} recorded, {} discovered, {} stopped, {} purged, {} expired, {} failed",
                    reconciler.name(),
                    report.recorded,
                    report.discovered,
                    report.stopped,
                    report.purged,
                    report.records_expired,
                    report.failed,
                );
                if report.stop_failed {
                    eprintln!("{}: stop command failed, will retry next pass", reconciler.name());
                }
                if report.remove_failed {
                    eprintln!("{}: remove command failed, will retry next pass", reconciler.name());
                }
            }
            Err(e) => {
                eprintln!("{}: {e}", reconciler.name());
                first_error.get_or_insert(e.into());
            }
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}
