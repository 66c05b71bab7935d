//! Internal error types for Transmission RPC operations.
//!
//! These errors are mapped to core port errors at the boundary.

use thiserror::Error;

/// Result type alias for Transmission operations.
pub type TransmissionResult<T> = Result<T, TransmissionError>;

/// Errors related to Transmission RPC operations.
#[derive(Debug, Error)]
pub enum TransmissionError {
    /// The RPC endpoint answered with an HTTP error status.
    #[error("Transmission request failed with status {status}: {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// The RPC endpoint
        url: String,
    },

    /// Transmission processed the call and reported a failure.
    #[error("Transmission {method} failed: {result}")]
    RpcFailure {
        /// The RPC method name
        method: String,
        /// The `result` string returned by Transmission
        result: String,
    },

    /// A 409 response without a usable session id header, or a second 409
    /// right after negotiating one.
    #[error("Failed to negotiate a Transmission session id")]
    SessionNegotiation,

    /// The response did not have the expected shape.
    #[error("Invalid response from Transmission: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
