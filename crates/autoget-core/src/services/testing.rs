//! In-memory fakes of both ports for reconciler tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use crate::domain::{DownloadState, DownloadStatus, MoveState, NewDownload};
use crate::ports::{
    DownloadStatusRepository, RepositoryError, SessionStats, TorrentClientError,
    TorrentClientPort, TorrentFile, TorrentSnapshot, TorrentStatus,
};

/// A call made against [`FakeTorrentClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    ListAll,
    SessionStats,
    Stop(Vec<i64>),
    Remove { ids: Vec<i64>, delete_local_data: bool },
}

#[derive(Default)]
struct ClientState {
    torrents: Vec<TorrentSnapshot>,
    download_speed: u64,
    fail_list: bool,
    fail_stats: bool,
    fail_stop: bool,
    fail_remove: bool,
    calls: Vec<ClientCall>,
}

/// Torrent client with a fixed snapshot and recorded calls.
#[derive(Default)]
pub struct FakeTorrentClient {
    state: Mutex<ClientState>,
}

impl FakeTorrentClient {
    pub fn with_torrents(torrents: Vec<TorrentSnapshot>) -> Self {
        let client = Self::default();
        client.state.lock().unwrap().torrents = torrents;
        client
    }

    pub fn set_torrents(&self, torrents: Vec<TorrentSnapshot>) {
        self.state.lock().unwrap().torrents = torrents;
    }

    pub fn set_download_speed(&self, speed: u64) {
        self.state.lock().unwrap().download_speed = speed;
    }

    pub fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn fail_stats(&self, fail: bool) {
        self.state.lock().unwrap().fail_stats = fail;
    }

    pub fn fail_stop(&self, fail: bool) {
        self.state.lock().unwrap().fail_stop = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.state.lock().unwrap().fail_remove = fail;
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the stop/remove calls.
    pub fn commands(&self) -> Vec<ClientCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ClientCall::Stop(_) | ClientCall::Remove { .. }))
            .collect()
    }
}

fn network_error() -> TorrentClientError {
    TorrentClientError::Network {
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl TorrentClientPort for FakeTorrentClient {
    async fn list_all_torrents(&self) -> Result<Vec<TorrentSnapshot>, TorrentClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClientCall::ListAll);
        if state.fail_list {
            return Err(network_error());
        }
        Ok(state.torrents.clone())
    }

    async fn session_stats(&self) -> Result<SessionStats, TorrentClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClientCall::SessionStats);
        if state.fail_stats {
            return Err(network_error());
        }
        Ok(SessionStats {
            download_speed: state.download_speed,
        })
    }

    async fn stop_torrents(&self, ids: &[i64]) -> Result<(), TorrentClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClientCall::Stop(ids.to_vec()));
        if state.fail_stop {
            return Err(network_error());
        }
        for torrent in &mut state.torrents {
            if ids.contains(&torrent.id) {
                torrent.status = TorrentStatus::Stopped;
            }
        }
        Ok(())
    }

    async fn remove_torrents(
        &self,
        ids: &[i64],
        delete_local_data: bool,
    ) -> Result<(), TorrentClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ClientCall::Remove {
            ids: ids.to_vec(),
            delete_local_data,
        });
        if state.fail_remove {
            return Err(network_error());
        }
        state.torrents.retain(|t| !ids.contains(&t.id));
        Ok(())
    }
}

/// Record store kept in a map, with the same monotonic write rules as the
/// SQLite store.
#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<HashMap<String, DownloadStatus>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl InMemoryRepository {
    /// Store a record verbatim, timestamps included.
    pub fn insert(&self, status: DownloadStatus) {
        self.records
            .lock()
            .unwrap()
            .insert(status.id.clone(), status);
    }

    pub fn record(&self, id: &str) -> Option<DownloadStatus> {
        self.records.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Make every write to `id` fail.
    pub fn fail_writes_for(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    fn check_writable(&self, id: &str) -> Result<(), RepositoryError> {
        if self.failing_ids.lock().unwrap().contains(id) {
            return Err(RepositoryError::Storage(format!("write to {id} failed")));
        }
        Ok(())
    }

    fn select(
        &self,
        downloader: &str,
        filter: impl Fn(&DownloadStatus) -> bool,
    ) -> Vec<DownloadStatus> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.downloader == downloader && filter(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    fn modify(
        &self,
        downloader: &str,
        id: &str,
        f: impl FnOnce(&mut DownloadStatus),
    ) -> Result<(), RepositoryError> {
        self.check_writable(id)?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(id) {
            Some(r) if r.downloader == downloader => {
                f(r);
                r.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl DownloadStatusRepository for InMemoryRepository {
    async fn list_started(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError> {
        Ok(self.select(downloader, |r| r.state == DownloadState::Started))
    }

    async fn list_unmoved(&self, downloader: &str) -> Result<Vec<DownloadStatus>, RepositoryError> {
        Ok(self.select(downloader, |r| {
            r.state >= DownloadState::Seeding && r.move_state == MoveState::UnMoved
        }))
    }

    async fn list_purgeable(
        &self,
        downloader: &str,
    ) -> Result<Vec<DownloadStatus>, RepositoryError> {
        Ok(self.select(downloader, DownloadStatus::is_purgeable))
    }

    async fn list_all(
        &self,
        downloader: Option<&str>,
    ) -> Result<Vec<DownloadStatus>, RepositoryError> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| downloader.is_none_or(|d| r.downloader == d))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get(&self, downloader: &str, id: &str) -> Result<DownloadStatus, RepositoryError> {
        self.records
            .lock()
            .unwrap()
            .get(id)
            .filter(|r| r.downloader == downloader)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn create(&self, download: &NewDownload) -> Result<DownloadStatus, RepositoryError> {
        self.check_writable(&download.id)?;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&download.id) {
            return Err(RepositoryError::AlreadyExists(download.id.clone()));
        }
        let status = DownloadStatus::started(download);
        records.insert(status.id.clone(), status.clone());
        Ok(status)
    }

    async fn save(&self, status: &DownloadStatus) -> Result<(), RepositoryError> {
        self.check_writable(&status.id)?;
        let mut records = self.records.lock().unwrap();
        let now = Utc::now();
        match records.get_mut(&status.id) {
            Some(existing) if existing.downloader != status.downloader => Err(
                RepositoryError::Constraint(format!("{} belongs to another downloader", status.id)),
            ),
            Some(existing) => {
                existing.state = existing.state.max(status.state);
                existing.move_state = existing.move_state.max(status.move_state);
                existing.upload_histories = status.upload_histories.clone();
                existing.updated_at = now;
                Ok(())
            }
            None => {
                let mut inserted = status.clone();
                inserted.created_at = now;
                inserted.updated_at = now;
                records.insert(inserted.id.clone(), inserted);
                Ok(())
            }
        }
    }

    async fn update_progress(
        &self,
        downloader: &str,
        id: &str,
        download_progress: i32,
        state: DownloadState,
    ) -> Result<(), RepositoryError> {
        self.modify(downloader, id, |r| {
            r.download_progress = download_progress;
            r.state = r.state.max(state);
        })
    }

    async fn update_move_state(
        &self,
        downloader: &str,
        id: &str,
        move_state: MoveState,
    ) -> Result<(), RepositoryError> {
        self.modify(downloader, id, |r| r.move_state = r.move_state.max(move_state))
    }

    async fn update_state(
        &self,
        downloader: &str,
        ids: &[String],
        state: DownloadState,
    ) -> Result<u64, RepositoryError> {
        let mut updated = 0;
        for id in ids {
            if self
                .modify(downloader, id, |r| r.state = r.state.max(state))
                .is_ok()
            {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_older_than(&self, downloader: &str, days: u32) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - TimeDelta::days(i64::from(days));
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, r| r.downloader != downloader || r.updated_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

/// A client-side torrent with sensible defaults.
pub fn torrent(id: i64, hash: &str, status: TorrentStatus) -> TorrentSnapshot {
    TorrentSnapshot {
        id,
        hash: hash.to_string(),
        name: format!("torrent {hash}"),
        status,
        percent_done: if status == TorrentStatus::Seeding { 1.0 } else { 0.0 },
        uploaded_ever: 0,
        download_dir: PathBuf::from("/downloads"),
        files: vec![TorrentFile {
            name: format!("{hash}.txt"),
            length: 1,
        }],
    }
}
