//! `TorrentClientPort` implementation for the Transmission client.

use std::path::PathBuf;

use async_trait::async_trait;
use autoget_core::{
    SessionStats, TorrentClientError, TorrentClientPort, TorrentFile, TorrentSnapshot,
    TorrentStatus,
};

use crate::client::TransmissionClient;
use crate::error::TransmissionError;
use crate::http::RpcBackend;
use crate::models::WireTorrent;

/// Translate Transmission's numeric status code.
const fn map_status(code: i64) -> Option<TorrentStatus> {
    match code {
        0 => Some(TorrentStatus::Stopped),
        1 => Some(TorrentStatus::QueuedToCheck),
        2 => Some(TorrentStatus::Checking),
        3 => Some(TorrentStatus::QueuedToDownload),
        4 => Some(TorrentStatus::Downloading),
        5 => Some(TorrentStatus::QueuedToSeed),
        6 => Some(TorrentStatus::Seeding),
        _ => None,
    }
}

fn to_snapshot(torrent: WireTorrent) -> Result<TorrentSnapshot, TorrentClientError> {
    let status = map_status(torrent.status).ok_or_else(|| TorrentClientError::InvalidResponse {
        message: format!(
            "torrent {} has unknown status {}",
            torrent.hash_string, torrent.status
        ),
    })?;

    Ok(TorrentSnapshot {
        id: torrent.id,
        hash: torrent.hash_string,
        name: torrent.name,
        status,
        percent_done: torrent.percent_done,
        uploaded_ever: torrent.uploaded_ever,
        download_dir: PathBuf::from(torrent.download_dir),
        files: torrent
            .files
            .into_iter()
            .map(|f| TorrentFile {
                name: f.name,
                length: f.length,
            })
            .collect(),
    })
}

fn map_error(err: TransmissionError) -> TorrentClientError {
    match err {
        TransmissionError::RpcFailure { method, result } => {
            TorrentClientError::RpcFailure { method, result }
        }
        TransmissionError::InvalidResponse { message } => {
            TorrentClientError::InvalidResponse { message }
        }
        TransmissionError::JsonParse(e) => TorrentClientError::InvalidResponse {
            message: e.to_string(),
        },
        TransmissionError::InvalidUrl(e) => TorrentClientError::Configuration {
            message: e.to_string(),
        },
        e @ (TransmissionError::HttpStatus { .. }
        | TransmissionError::SessionNegotiation
        | TransmissionError::Network(_)) => TorrentClientError::Network {
            message: e.to_string(),
        },
    }
}

#[async_trait]
impl<B: RpcBackend> TorrentClientPort for TransmissionClient<B> {
    async fn list_all_torrents(&self) -> Result<Vec<TorrentSnapshot>, TorrentClientError> {
        self.torrent_get_all()
            .await
            .map_err(map_error)?
            .into_iter()
            .map(to_snapshot)
            .collect()
    }

    async fn session_stats(&self) -> Result<SessionStats, TorrentClientError> {
        let stats = self.fetch_session_stats().await.map_err(map_error)?;
        Ok(SessionStats {
            download_speed: stats.download_speed,
        })
    }

    async fn stop_torrents(&self, ids: &[i64]) -> Result<(), TorrentClientError> {
        self.torrent_stop(ids).await.map_err(map_error)
    }

    async fn remove_torrents(
        &self,
        ids: &[i64],
        delete_local_data: bool,
    ) -> Result<(), TorrentClientError> {
        self.torrent_remove(ids, delete_local_data)
            .await
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;
    use serde_json::json;

    fn client(backend: FakeBackend) -> TransmissionClient<FakeBackend> {
        TransmissionClient::with_backend(backend)
    }

    #[test]
    fn test_map_status() {
        assert_eq!(map_status(0), Some(TorrentStatus::Stopped));
        assert_eq!(map_status(4), Some(TorrentStatus::Downloading));
        assert_eq!(map_status(6), Some(TorrentStatus::Seeding));
        assert_eq!(map_status(7), None);
        assert_eq!(map_status(-1), None);
    }

    #[test]
    fn test_map_error() {
        assert!(matches!(
            map_error(TransmissionError::SessionNegotiation),
            TorrentClientError::Network { .. }
        ));
        assert!(matches!(
            map_error(TransmissionError::HttpStatus {
                status: 401,
                url: "http://localhost:9091/transmission/rpc".to_string(),
            }),
            TorrentClientError::Network { .. }
        ));
        assert!(matches!(
            map_error(TransmissionError::RpcFailure {
                method: "torrent-stop".to_string(),
                result: "nope".to_string(),
            }),
            TorrentClientError::RpcFailure { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_all_torrents_converts_snapshots() {
        let port = client(FakeBackend::new().with_response(json!({
            "result": "success",
            "arguments": {"torrents": [
                {
                    "id": 1,
                    "hashString": "r1",
                    "name": "One",
                    "status": 4,
                    "percentDone": 0.5,
                    "uploadedEver": 0,
                    "downloadDir": "/downloads",
                    "files": [{"name": "sub/r1.txt", "length": 3}]
                },
                {"id": 2, "hashString": "r2", "status": 6}
            ]}
        })));

        let torrents = port.list_all_torrents().await.unwrap();
        assert_eq!(torrents.len(), 2);
        assert_eq!(torrents[0].status, TorrentStatus::Downloading);
        assert_eq!(torrents[0].download_dir, PathBuf::from("/downloads"));
        assert_eq!(torrents[0].files[0].name, "sub/r1.txt");
        assert!(torrents[1].status.is_seeding());
        assert!(torrents[1].files.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_status_is_invalid_response() {
        let port = client(FakeBackend::new().with_response(json!({
            "result": "success",
            "arguments": {"torrents": [{"id": 1, "hashString": "r1", "status": 42}]}
        })));

        assert!(matches!(
            port.list_all_torrents().await,
            Err(TorrentClientError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_stats() {
        let port = client(FakeBackend::new().with_response(json!({
            "result": "success",
            "arguments": {"downloadSpeed": 2_500_000, "uploadSpeed": 10}
        })));

        let stats = TorrentClientPort::session_stats(&port).await.unwrap();
        assert_eq!(stats.download_speed, 2_500_000);
    }

    #[tokio::test]
    async fn test_stop_sends_ids() {
        let port = client(FakeBackend::new().with_response(json!({"result": "success"})));
        port.stop_torrents(&[3, 5]).await.unwrap();

        let request = &port.backend.requests()[0];
        assert_eq!(request.method, "torrent-stop");
        assert_eq!(request.arguments, json!({"ids": [3, 5]}));
    }

    #[tokio::test]
    async fn test_remove_deletes_local_data() {
        let port = client(FakeBackend::new().with_response(json!({"result": "success"})));
        port.remove_torrents(&[4], true).await.unwrap();

        let request = &port.backend.requests()[0];
        assert_eq!(request.method, "torrent-remove");
        assert_eq!(
            request.arguments,
            json!({"ids": [4], "delete-local-data": true})
        );
    }

    #[tokio::test]
    async fn test_rpc_failure_surfaces() {
        let port = client(FakeBackend::new().with_response(json!({"result": "invalid argument"})));
        let err = port.stop_torrents(&[1]).await.unwrap_err();
        assert_eq!(err.to_string(), "torrent-stop failed: invalid argument");
    }
}
