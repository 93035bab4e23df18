//! Client configuration with TOML file support.

use ballot_gateway_rpc::RpcGatewayConfig;
use ballot_governance::DEFAULT_FETCH_CONCURRENCY;
use ballot_types::WalletAddress;
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

/// Configuration for the `ballot` client.
///
/// Loaded from a TOML file via [`ClientConfig::from_toml_file`]; command-line
/// flags and `BALLOT_*` environment variables override individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Governance node JSON-RPC endpoint.
    #[serde(default = "default_node_url")]
    pub node_url: String,

    /// Wallet to act as. Reads work without one; writes need it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<WalletAddress>,

    /// Proposal reads kept in flight while listing.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Receipt polling interval while a write is pending.
    #[serde(default = "default_confirmation_poll_ms")]
    pub confirmation_poll_ms: u64,

    /// Stop waiting for a confirmation after this many seconds. Unset waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_timeout_secs: Option<u64>,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log filter, e.g. "warn" or "info,ballot_governance=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ───────────────────────────────────────────────

fn default_node_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

fn default_confirmation_poll_ms() -> u64 {
    1_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Gateway settings derived from this configuration.
    pub fn rpc_config(&self) -> RpcGatewayConfig {
        let mut rpc = RpcGatewayConfig::new(self.node_url.clone());
        rpc.request_timeout = Duration::from_secs(self.request_timeout_secs);
        rpc.poll_interval = Duration::from_millis(self.confirmation_poll_ms);
        rpc.confirmation_timeout = self.confirmation_timeout_secs.map(Duration::from_secs);
        rpc
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            account: None,
            fetch_concurrency: default_fetch_concurrency(),
            confirmation_poll_ms: default_confirmation_poll_ms(),
            confirmation_timeout_secs: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
