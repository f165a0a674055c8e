//! Client configuration
//!
//! Endpoints and timeouts used by [`PdsClient`](crate::services::client::PdsClient).
//! Defaults target the public Bluesky service; `from_env` overlays the `XRPC_URL` and
//! `WS_URL` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const XRPC_URL_ENV: &str = "XRPC_URL";
pub const WS_URL_ENV: &str = "WS_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL for XRPC calls, including the `/xrpc` path
    pub xrpc_url: String,

    /// WebSocket URL of the repository event stream
    pub firehose_url: String,

    /// User agent sent with every HTTP request
    pub user_agent: String,

    /// Timeout for individual HTTP requests in milliseconds
    pub request_timeout_ms: u64,

    /// Timeout for opening connections in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            xrpc_url: "https://bsky.social/xrpc".to_string(),
            firehose_url: "wss://bsky.network/xrpc/com.atproto.sync.subscribeRepos".to_string(),
            user_agent: format!("lazuli/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Configuration for explicit endpoints
    pub fn new(xrpc_url: impl Into<String>, firehose_url: impl Into<String>) -> Self {
        Self {
            xrpc_url: xrpc_url.into(),
            firehose_url: firehose_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `XRPC_URL` / `WS_URL` when they are set and non-empty.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(XRPC_URL_ENV).filter(|v| !v.is_empty()) {
            debug!("Using {} from environment: {}", XRPC_URL_ENV, url);
            self.xrpc_url = url;
        }
        if let Some(url) = lookup(WS_URL_ENV).filter(|v| !v.is_empty()) {
            debug!("Using {} from environment: {}", WS_URL_ENV, url);
            self.firehose_url = url;
        }
        self
    }

    /// Full URL of an XRPC method
    pub fn xrpc_endpoint(&self, nsid: &str) -> String {
        format!("{}/{}", self.xrpc_url.trim_end_matches('/'), nsid)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.xrpc_url, "https://bsky.social/xrpc");
        assert!(config.firehose_url.starts_with("wss://"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_overlay_from_lookup() {
        let config = ClientConfig::default().overlay(|key| match key {
            XRPC_URL_ENV => Some("http://localhost:2583/xrpc".to_string()),
            WS_URL_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.xrpc_url, "http://localhost:2583/xrpc");
        assert_eq!(config.firehose_url, ClientConfig::default().firehose_url);
    }

    #[test]
    fn test_xrpc_endpoint_joins_paths() {
        let config = ClientConfig::new("http://pds.test/xrpc/", "ws://pds.test");
        assert_eq!(
            config.xrpc_endpoint("com.atproto.server.createSession"),
            "http://pds.test/xrpc/com.atproto.server.createSession"
        );
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"xrpc_url": "http://pds.test/xrpc"}"#).unwrap();
        assert_eq!(config.xrpc_url, "http://pds.test/xrpc");
        assert_eq!(config.request_timeout_ms, 30_000);
    }
}
