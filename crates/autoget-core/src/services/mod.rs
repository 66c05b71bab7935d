//! Reconciliation services.
//!
//! The [`Reconciler`] orchestrates the two ports. It has two entry points,
//! meant to be scheduled independently:
//!
//! - `run_progress_sync` (every minute): progress, `Started -> Seeding`,
//!   and file finalization
//! - `run_seeding_policy` (daily): upload history, `Seeding -> Stopped`,
//!   and purging of stopped torrents

mod finalize;
mod progress_sync;
mod reconciler;
mod seeding_policy;

#[cfg(test)]
pub(crate) mod testing;

pub use finalize::{FinalizeError, copy_torrent_files};
pub use progress_sync::{BUSY_DOWNLOAD_SPEED, ProgressSyncReport};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use seeding_policy::SeedingPolicyReport;
