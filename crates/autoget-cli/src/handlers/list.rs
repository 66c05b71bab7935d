//! List command handler.

use anyhow::Result;
use autoget_core::DownloadStatus;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print stored records, newest first.
pub async fn execute(ctx: &CliContext, downloader: Option<&str>) -> Result<()> {
    if let Some(name) = downloader {
        ctx.config.downloader(name)?;
    }

    let records = ctx.repo.list_all(downloader).await.map_err(CliError::from)?;
    if records.is_empty() {
        println!("No tracked downloads.");
        return Ok(());
    }

    println!(
        "{:<42} {:<10} {:>6} {:<8} {:<8} {:<20} Title",
        "Hash", "Downloader", "Done", "State", "Move", "Updated"
    );
    println!("{}", "-".repeat(110));
    for record in &records {
        println!("{}", format_row(record));
    }

    Ok(())
}

fn format_row(record: &DownloadStatus) -> String {
    format!(
        "{:<42} {:<10} {:>5.1}% {:<8} {:<8} {:<20} {}",
        truncate(&record.id, 41),
        truncate(&record.downloader, 10),
        f64::from(record.download_progress) / 10.0,
        record.state.as_str(),
        record.move_state.as_str(),
        record
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S"),
        record.res_title
    )
}

/// Cut `s` to at most `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
