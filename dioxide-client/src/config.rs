//! Client configuration

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use dioxide_spec::TxConfig;

use crate::error::{ClientError, Result};

/// Environment variable overriding the RPC endpoint
pub const ENV_RPC_URL: &str = "DIOXIDE_RPC_URL";

/// Environment variable overriding the PoW budget in milliseconds
pub const ENV_POW_TIMEOUT_MS: &str = "DIOXIDE_POW_TIMEOUT_MS";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC endpoint, e.g. `http://127.0.0.1:62222/api`
    pub rpc_url: String,

    /// Budget for a single RPC request
    pub request_timeout_ms: u64,

    /// Budget for the proof-of-work nonce search
    pub pow_timeout_ms: u64,

    /// Budget for waiting on confirmation
    pub confirmation_timeout_ms: u64,

    /// Delay between confirmation polls
    pub poll_interval_ms: u64,

    /// Transaction header defaults
    pub tx: TxConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:62222/api".to_string(),
            request_timeout_ms: 10_000,
            pow_timeout_ms: 60_000,
            confirmation_timeout_ms: 60_000,
            poll_interval_ms: 1_000,
            tx: TxConfig::DEFAULT,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `DIOXIDE_RPC_URL` and `DIOXIDE_POW_TIMEOUT_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_RPC_URL) {
            config.rpc_url = url;
        }
        if let Some(ms) = lookup(ENV_POW_TIMEOUT_MS) {
            config.pow_timeout_ms = ms.trim().parse().map_err(|_| {
                ClientError::InvalidClientConfig(format!("{} is not a number: {}", ENV_POW_TIMEOUT_MS, ms))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(ClientError::InvalidClientConfig("rpc_url must not be empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ClientError::InvalidClientConfig("poll_interval_ms must be non-zero".to_string()));
        }
        self.tx.validate()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn pow_timeout(&self) -> Duration {
        Duration::from_millis(self.pow_timeout_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientConfig {{ rpc_url: {}, pow_timeout_ms: {}, confirmation_timeout_ms: {}, {} }}",
            self.rpc_url, self.pow_timeout_ms, self.confirmation_timeout_ms, self.tx,
        )
    }
}
