#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Test-only dependencies used by the integration tests
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use sqlx as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod scheduler;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap, bootstrap_with};
pub use commands::Commands;
pub use config::AppConfig;
pub use error::CliError;
pub use parser::Cli;
pub use scheduler::{Schedule, next_daily_run};
