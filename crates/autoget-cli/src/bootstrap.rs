//! CLI bootstrap - the composition root.
//!
//! This is the only place where infrastructure is wired together:
//! - the SQLite record store (via autoget-db)
//! - one Transmission client per downloader (via autoget-transmission)
//! - one `Reconciler` per downloader (via autoget-core)

use std::sync::Arc;

use anyhow::{Context, Result};
use autoget_core::{
    DownloadStatusRepository, DownloaderConfig, Reconciler, ReconcilerConfig, TorrentClientPort,
};
use autoget_db::RepositoryFactory;
use autoget_transmission::{DefaultTransmissionClient, TransmissionClientConfig};

use crate::config::AppConfig;
use crate::error::CliError;

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub config: AppConfig,
    /// Shared record store.
    pub repo: Arc<dyn DownloadStatusRepository>,
    /// One reconciler per downloader, in name order.
    pub reconcilers: Vec<Arc<Reconciler>>,
}

impl CliContext {
    /// Reconcilers to run, optionally narrowed to one downloader.
    pub fn select(&self, downloader: Option<&str>) -> Result<Vec<Arc<Reconciler>>, CliError> {
        let Some(name) = downloader else {
            return Ok(self.reconcilers.clone());
        };
        self.reconcilers
            .iter()
            .find(|r| r.name() == name)
            .map(|r| vec![Arc::clone(r)])
            .ok_or_else(|| CliError::Arguments(format!("unknown downloader '{name}'")))
    }
}

/// Build the reconciler for one downloader.
pub fn build_reconciler(
    name: &str,
    downloader: &DownloaderConfig,
    client: Arc<dyn TorrentClientPort>,
    repo: Arc<dyn DownloadStatusRepository>,
) -> Result<Reconciler, CliError> {
    let transmission = downloader
        .transmission
        .as_ref()
        .ok_or_else(|| CliError::Config(format!("downloader '{name}' has no transmission section")))?;

    let config = ReconcilerConfig::new(transmission.finished_dir.clone())
        .with_seeding_policy(downloader.seeding_policy);

    Ok(Reconciler::new(name, config, client, repo))
}

/// Bootstrap the CLI application from a validated config.
pub async fn bootstrap(config: AppConfig) -> Result<CliContext> {
    let repo = RepositoryFactory::open(&config.database_path)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    let mut clients: Vec<(String, Arc<dyn TorrentClientPort>)> = Vec::new();
    for (name, downloader) in &config.downloaders {
        let Some(transmission) = downloader.transmission.as_ref() else {
            return Err(CliError::Config(format!(
                "downloader '{name}' has no transmission section"
            ))
            .into());
        };
        let client = DefaultTransmissionClient::new(&TransmissionClientConfig::from(transmission))
            .with_context(|| format!("creating Transmission client for '{name}'"))?;
        tracing::debug!(downloader = %name, url = %transmission.url, "Configured Transmission client");
        clients.push((name.clone(), Arc::new(client)));
    }

    Ok(bootstrap_with(config, repo, clients)?)
}

/// Bootstrap with injected clients and store (for testing).
pub fn bootstrap_with(
    config: AppConfig,
    repo: Arc<dyn DownloadStatusRepository>,
    clients: Vec<(String, Arc<dyn TorrentClientPort>)>,
) -> Result<CliContext, CliError> {
    let mut reconcilers = Vec::with_capacity(clients.len());
    for (name, client) in clients {
        let downloader = config.downloader(&name)?;
        let reconciler = build_reconciler(&name, downloader, client, Arc::clone(&repo))?;
        reconcilers.push(Arc::new(reconciler));
    }

    Ok(CliContext {
        config,
        repo,
        reconcilers,
    })
}
