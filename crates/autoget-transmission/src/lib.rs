#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultTransmissionClient;

// Configuration
pub use config::TransmissionClientConfig;

// Errors
pub use error::{TransmissionError, TransmissionResult};
