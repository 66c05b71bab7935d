//! Public configuration for the Transmission client.

use std::time::Duration;

use autoget_core::TransmissionConfig;
use autoget_core::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_TRANSMISSION_URL};

/// Configuration for the Transmission RPC client.
///
/// # Example
///
/// ```
/// use autoget_transmission::TransmissionClientConfig;
/// use std::time::Duration;
///
/// let config = TransmissionClientConfig::new()
///     .with_url("http://nas:9091/transmission/rpc")
///     .with_credentials("user", "secret")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct TransmissionClientConfig {
    /// Full RPC endpoint URL
    pub(crate) url: String,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    /// Timeout for one HTTP round trip
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
}

impl Default for TransmissionClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRANSMISSION_URL.to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("autoget/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransmissionClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RPC endpoint.
    ///
    /// Defaults to `http://localhost:9091/transmission/rpc`.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Use HTTP basic auth.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Username and password, when both are set and non-empty.
    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl From<&TransmissionConfig> for TransmissionClientConfig {
    fn from(settings: &TransmissionConfig) -> Self {
        Self {
            url: settings.url.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            ..Self::default()
        }
    }
}
