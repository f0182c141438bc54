//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Production API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.coinpayments.net/api.php";

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// API key pair.
    pub credentials: CredentialsConfig,

    /// Remote endpoint settings.
    pub api: ApiConfig,

    /// Transaction tracking and polling.
    pub tracking: TrackingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// API key pair as read from config or environment.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Public key.
    pub key: String,

    /// Private secret used for HMAC signing.
    pub secret: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Full URL requests are POSTed to.
    pub endpoint: String,

    /// Optional whole-request timeout in seconds. None leaves it to the transport.
    pub timeout_secs: Option<u64>,

    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            user_agent: concat!("coinpayments-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Transaction tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Track transactions created through the client and poll their status.
    pub auto_track: bool,

    /// Seconds between status polls.
    pub poll_interval_secs: u64,

    /// Buffered events per subscriber before slow subscribers start lagging.
    pub event_capacity: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            auto_track: false,
            poll_interval_secs: 30,
            event_capacity: 64,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
