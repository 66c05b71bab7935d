//! Transmission RPC client.
//!
//! Thin typed wrappers over the four RPC methods the reconciler needs.

use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::{Value, json};

use crate::config::TransmissionClientConfig;
use crate::error::{TransmissionError, TransmissionResult};
use crate::http::{ReqwestBackend, RpcBackend};
use crate::models::{
    RpcOutcome, RpcRequest, TORRENT_FIELDS, TorrentGetArguments, WireSessionStats, WireTorrent,
};

/// Transmission client using the production HTTP backend.
pub type DefaultTransmissionClient = TransmissionClient<ReqwestBackend>;

/// Transmission RPC client, generic over its HTTP backend.
pub struct TransmissionClient<B: RpcBackend> {
    pub(crate) backend: B,
    next_tag: AtomicI64,
}

impl TransmissionClient<ReqwestBackend> {
    /// Create a client talking to the endpoint in `config`.
    pub fn new(config: &TransmissionClientConfig) -> TransmissionResult<Self> {
        Ok(Self::with_backend(ReqwestBackend::new(config)?))
    }
}

impl<B: RpcBackend> TransmissionClient<B> {
    pub(crate) const fn with_backend(backend: B) -> Self {
        Self {
            backend,
            next_tag: AtomicI64::new(1),
        }
    }

    /// Perform one call and return its `arguments` on success.
    async fn call(&self, method: &str, arguments: Value) -> TransmissionResult<Value> {
        let request = RpcRequest {
            method: method.to_string(),
            arguments,
            tag: self.next_tag.fetch_add(1, Ordering::Relaxed),
        };
        let response = self.backend.call(&request).await?;

        match response.result.outcome() {
            RpcOutcome::Success => Ok(response.arguments),
            RpcOutcome::Failure(result) => Err(TransmissionError::RpcFailure {
                method: method.to_string(),
                result,
            }),
        }
    }

    /// `torrent-get` for every torrent.
    pub async fn torrent_get_all(&self) -> TransmissionResult<Vec<WireTorrent>> {
        let arguments = self
            .call("torrent-get", json!({ "fields": TORRENT_FIELDS }))
            .await?;
        let parsed: TorrentGetArguments = serde_json::from_value(arguments)?;
        Ok(parsed.torrents)
    }

    pub async fn fetch_session_stats(&self) -> TransmissionResult<WireSessionStats> {
        let arguments = self.call("session-stats", Value::Null).await?;
        Ok(serde_json::from_value(arguments)?)
    }

    pub async fn torrent_stop(&self, ids: &[i64]) -> TransmissionResult<()> {
        self.call("torrent-stop", json!({ "ids": ids })).await?;
        Ok(())
    }

    pub async fn torrent_remove(&self, ids: &[i64], delete_local_data: bool) -> TransmissionResult<()> {
        self.call(
            "torrent-remove",
            json!({ "ids": ids, "delete-local-data": delete_local_data }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeBackend;

    #[tokio::test]
    async fn test_torrent_get_requests_fields() {
        let client = TransmissionClient::with_backend(FakeBackend::new().with_response(json!({
            "result": "success",
            "arguments": {"torrents": [{
                "id": 7,
                "hashString": "abc",
                "name": "Some Show",
                "status": 6,
                "percentDone": 1.0,
                "uploadedEver": 2048,
                "downloadDir": "/downloads",
                "files": [{"name": "a.mkv", "length": 10}]
            }]}
        })));

        let torrents = client.torrent_get_all().await.unwrap();
        assert_eq!(torrents.len(), 1);
        assert_eq!(torrents[0].hash_string, "abc");
        assert_eq!(torrents[0].uploaded_ever, 2048);

        let requests = client.backend.requests();
        assert_eq!(requests[0].method, "torrent-get");
        assert_eq!(requests[0].arguments["fields"][1], "hashString");
    }

    #[tokio::test]
    async fn test_tags_increase() {
        let client = TransmissionClient::with_backend(
            FakeBackend::new()
                .with_response(json!({"result": "success"}))
                .with_response(json!({"result": "success"})),
        );
        client.torrent_stop(&[1]).await.unwrap();
        client.torrent_stop(&[2]).await.unwrap();

        let tags: Vec<_> = client.backend.requests().iter().map(|r| r.tag).collect();
        assert_eq!(tags, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failure_result_is_an_error() {
        let client = TransmissionClient::with_backend(
            FakeBackend::new().with_response(json!({"result": "no such torrent"})),
        );

        let err = client.torrent_remove(&[9], true).await.unwrap_err();
        match err {
            TransmissionError::RpcFailure { method, result } => {
                assert_eq!(method, "torrent-remove");
                assert_eq!(result, "no such torrent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_stats_without_arguments_fails() {
        let client = TransmissionClient::with_backend(
            FakeBackend::new().with_response(json!({"result": "success"})),
        );
        // `arguments` defaults to null, which is not an object.
        assert!(matches!(
            client.fetch_session_stats().await,
            Err(TransmissionError::JsonParse(_))
        ));
        assert!(client.backend.requests()[0].arguments.is_null());
    }
}
