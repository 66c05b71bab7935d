//! Daemon scheduling.
//!
//! Each reconciler gets two tasks: a progress loop on a fixed interval and a
//! daily seeding loop. All loops stop when the shared token is cancelled; a
//! pass that is already running finishes first.

use std::sync::Arc;
use std::time::Duration;

use autoget_core::Reconciler;
use chrono::{DateTime, Local, TimeZone};
use tokio::task::JoinSet;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// When the two passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub progress_interval: Duration,
    /// Local hour (0-23) of the daily seeding pass.
    pub daily_check_hour: u32,
}

/// Next occurrence of `hour:00:00` strictly after `now`, in `now`'s zone.
///
/// Days where that wall-clock time does not exist (DST gap) are skipped.
/// Returns `None` only for an hour outside `0..=23`.
pub fn next_daily_run<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..3 {
        let candidate = date.and_hms_opt(hour, 0, 0)?;
        if let Some(at) = tz.from_local_datetime(&candidate).earliest()
            && at > *now
        {
            return Some(at);
        }
        date = date.succ_opt()?;
    }
    None
}

/// Run both loops for every reconciler until `token` is cancelled.
pub async fn run(reconcilers: Vec<Arc<Reconciler>>, schedule: Schedule, token: CancellationToken) {
    let mut tasks = JoinSet::new();
    for reconciler in reconcilers {
        tasks.spawn(progress_loop(
            Arc::clone(&reconciler),
            schedule.progress_interval,
            token.clone(),
        ));
        tasks.spawn(daily_loop(reconciler, schedule.daily_check_hour, token.clone()));
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Scheduler task panicked");
        }
    }
}

async fn progress_loop(reconciler: Arc<Reconciler>, period: Duration, token: CancellationToken) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(downloader = %reconciler.name(), period_secs = period.as_secs(), "Starting progress loop");

    loop {
        tokio::select! {
            biased;

            () = token.cancelled() => break,
            _ = ticker.tick() => {
                // Logged in detail by the reconciler; the next tick retries.
                if let Err(e) = reconciler.run_progress_sync().await {
                    debug!(downloader = %reconciler.name(), error = %e, "Progress sync aborted");
                }
            }
        }
    }

    debug!(downloader = %reconciler.name(), "Progress loop stopped");
}

async fn daily_loop(reconciler: Arc<Reconciler>, hour: u32, token: CancellationToken) {
    loop {
        let now = Local::now();
        let Some(next) = next_daily_run(&now, hour) else {
            error!(downloader = %reconciler.name(), hour, "Invalid daily check hour");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        info!(downloader = %reconciler.name(), next_run = %next, "Seeding policy scheduled");

        tokio::select! {
            biased;

            () = token.cancelled() => break,
            () = tokio::time::sleep(wait) => {
                if let Err(e) = reconciler.run_seeding_policy().await {
                    debug!(downloader = %reconciler.name(), error = %e, "Seeding policy aborted");
                }
            }
        }
    }

    debug!(downloader = %reconciler.name(), "Seeding loop stopped");
}

/// Resolve when the process receives SIGINT or (on Unix) SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 6, 30, 0).unwrap();
        let next = next_daily_run(&now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let next = next_daily_run(&now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 11, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_exactly_at_hour_schedules_next_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let next = next_daily_run(&now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 11, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_respects_offset() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 12, 31, 23, 0, 0).unwrap();
        let next = next_daily_run(&now, 8).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2027, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 6, 30, 0).unwrap();
        assert!(next_daily_run(&now, 24).is_none());
    }
}
