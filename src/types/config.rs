//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file, then environment
//! variables. CLI flags are applied on top by the binary.

use crate::facade::DetailTier;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Daemon liveness probe timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Interval between scheduled liveness probes.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(30);
/// Timeout for a single proxied tool call.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote daemon bridge configuration.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Catalog presentation.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from an optional file, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw).map_err(|e| {
                    Error::configuration(format!("{}: {}", path.display(), e))
                })?
            }
            None => Config::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("DECIBEL_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Ok(url) = std::env::var("DECIBEL_DAEMON_URL") {
            self.bridge.daemon_url = Some(url);
        }
        if let Ok(tier) = std::env::var("DECIBEL_DETAIL_TIER") {
            self.catalog.default_tier = tier.parse().map_err(|_| {
                Error::configuration(format!("DECIBEL_DETAIL_TIER: unknown tier '{}'", tier))
            })?;
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP transport bind address.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4488".to_string(),
        }
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the coordinating daemon (e.g. `http://127.0.0.1:4488`).
    pub daemon_url: Option<String>,

    #[serde(with = "humantime_serde")]
    pub probe_interval: Duration,

    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            daemon_url: None,
            probe_interval: PROBE_INTERVAL,
            probe_timeout: PROBE_TIMEOUT,
            call_timeout: CALL_TIMEOUT,
        }
    }
}

/// Catalog presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Tier served when a ListTools request carries no `detailTier` hint.
    #[serde(default)]
    pub default_tier: DetailTier,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
