//! Transmission RPC wire types.
//!
//! Nothing here leaves the crate; `port.rs` converts to core types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields requested by `torrent-get`.
pub const TORRENT_FIELDS: &[&str] = &[
    "id",
    "hashString",
    "name",
    "status",
    "percentDone",
    "uploadedEver",
    "downloadDir",
    "files",
];

/// Request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub arguments: Value,
    pub tag: i64,
}

/// Response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub result: RawResult,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default)]
    pub tag: Option<i64>,
}

/// The `result` field as it appears on the wire.
///
/// Transmission sends a string; some proxies and forks send a numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawResult {
    Text(String),
    Code(i64),
}

/// Normalised result of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcOutcome {
    Success,
    Failure(String),
}

impl RawResult {
    pub fn outcome(&self) -> RpcOutcome {
        match self {
            Self::Text(text) if text == "success" => RpcOutcome::Success,
            Self::Text(text) => RpcOutcome::Failure(text.clone()),
            Self::Code(0) => RpcOutcome::Success,
            Self::Code(code) => RpcOutcome::Failure(format!("error code {code}")),
        }
    }
}

/// `torrent-get` arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGetArguments {
    #[serde(default)]
    pub torrents: Vec<WireTorrent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTorrent {
    pub id: i64,
    pub hash_string: String,
    #[serde(default)]
    pub name: String,
    pub status: i64,
    #[serde(default)]
    pub percent_done: f64,
    #[serde(default)]
    pub uploaded_ever: i64,
    #[serde(default)]
    pub download_dir: String,
    #[serde(default)]
    pub files: Vec<WireFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFile {
    pub name: String,
    #[serde(default)]
    pub length: i64,
}

/// `session-stats` arguments (only the fields we read).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSessionStats {
    #[serde(default)]
    pub download_speed: u64,
}
