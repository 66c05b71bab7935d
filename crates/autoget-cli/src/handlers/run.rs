//! Daemon command handler.

use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::bootstrap::CliContext;
use crate::scheduler::{self, Schedule};

/// Schedule every reconciler until SIGINT/SIGTERM.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let schedule = Schedule {
        progress_interval: Duration::from_secs(ctx.config.progress_interval_secs),
        daily_check_hour: ctx.config.daily_check_hour,
    };
    let token = CancellationToken::new();

    tracing::info!(
        downloaders = ctx.reconcilers.len(),
        progress_interval_secs = ctx.config.progress_interval_secs,
        daily_check_hour = ctx.config.daily_check_hour,
        "autoget daemon starting"
    );

    let signal_token = token.clone();
    tokio::spawn(async move {
        scheduler::shutdown_signal().await;
        signal_token.cancel();
    });

    scheduler::run(ctx.reconcilers.clone(), schedule, token).await;
    tracing::info!("autoget daemon stopped");
    Ok(())
}
