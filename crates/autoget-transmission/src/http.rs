//! HTTP backend abstraction for the Transmission RPC endpoint.
//!
//! The production backend handles session-id negotiation. Tests inject a
//! fake backend with canned envelopes.

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use url::Url;

use crate::config::TransmissionClientConfig;
use crate::error::{TransmissionError, TransmissionResult};
use crate::models::{RpcRequest, RpcResponse};

/// Header carrying Transmission's CSRF token.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

// ============================================================================
// RPC Backend Trait
// ============================================================================

/// Sends one RPC envelope and returns the decoded response envelope.
///
/// This is an implementation detail; external code goes through the
/// `TorrentClientPort` trait.
#[async_trait]
pub trait RpcBackend: Send + Sync {
    async fn call(&self, request: &RpcRequest) -> TransmissionResult<RpcResponse>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production backend using reqwest.
pub struct ReqwestBackend {
    client: reqwest::Client,
    url: Url,
    credentials: Option<(String, String)>,
    session_id: RwLock<Option<String>>,
}

impl ReqwestBackend {
    /// Build the HTTP client for `config`.
    pub fn new(config: &TransmissionClientConfig) -> TransmissionResult<Self> {
        let url = Url::parse(&config.url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            url,
            credentials: config
                .credentials()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            session_id: RwLock::new(None),
        })
    }

    async fn send(&self, request: &RpcRequest) -> TransmissionResult<reqwest::Response> {
        let mut builder = self.client.post(self.url.as_str()).json(request);
        if let Some(id) = self.session_id.read().await.as_deref() {
            builder = builder.header(SESSION_ID_HEADER, id);
        }
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }
        Ok(builder.send().await?)
    }
}

#[async_trait]
impl RpcBackend for ReqwestBackend {
    async fn call(&self, request: &RpcRequest) -> TransmissionResult<RpcResponse> {
        // The first attempt may be rejected with 409 to hand out a session id.
        for _ in 0..2 {
            let response = self.send(request).await?;
            let status = response.status();

            if status == StatusCode::CONFLICT {
                let id = response
                    .headers()
                    .get(SESSION_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
                    .ok_or(TransmissionError::SessionNegotiation)?;
                tracing::debug!(method = %request.method, "Negotiated new Transmission session id");
                *self.session_id.write().await = Some(id);
                continue;
            }

            if !status.is_success() {
                return Err(TransmissionError::HttpStatus {
                    status: status.as_u16(),
                    url: self.url.to_string(),
                });
            }

            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(TransmissionError::SessionNegotiation)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
