//! Daemon liveness state and the monitor task that drives it.
//!
//! The state lives in a single `watch` cell. Only two writers exist: the
//! monitor (probe results) and the adapter (demotion after a failed proxied
//! call). Writes that do not change `alive` still refresh `last_probe_at`
//! but do not wake subscribers.

use super::client::DaemonClient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Where calls currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeMode {
    Local,
    Proxy,
}

/// Snapshot of the daemon's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonHealth {
    pub alive: bool,
    pub last_probe_at: Option<DateTime<Utc>>,
}

impl DaemonHealth {
    pub fn mode(&self) -> BridgeMode {
        if self.alive {
            BridgeMode::Proxy
        } else {
            BridgeMode::Local
        }
    }
}

/// Shared health cell.
#[derive(Debug, Clone)]
pub struct HealthCell {
    tx: Arc<watch::Sender<DaemonHealth>>,
}

impl Default for HealthCell {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthCell {
    /// Starts down with no probe recorded.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DaemonHealth {
            alive: false,
            last_probe_at: None,
        });
        Self { tx: Arc::new(tx) }
    }

    /// Record a probe outcome. Returns true when the mode changed.
    pub fn record_probe(&self, alive: bool) -> bool {
        let now = Utc::now();
        let changed = self.tx.send_if_modified(|health| {
            // Timestamp always advances; only a flip notifies.
            health.last_probe_at = Some(now);
            if health.alive == alive {
                return false;
            }
            health.alive = alive;
            true
        });
        if changed {
            if alive {
                tracing::info!("daemon reachable, switching to proxy mode");
            } else {
                tracing::warn!("daemon probe failed, switching to local mode");
            }
        }
        changed
    }

    /// Mark the daemon down after a failed proxied call. Idempotent.
    pub fn demote(&self, reason: &str) -> bool {
        let changed = self.tx.send_if_modified(|health| {
            if !health.alive {
                return false;
            }
            health.alive = false;
            true
        });
        if changed {
            tracing::warn!(reason, "proxied call failed, switching to local mode");
        }
        changed
    }

    pub fn is_alive(&self) -> bool {
        self.tx.borrow().alive
    }

    pub fn mode(&self) -> BridgeMode {
        self.tx.borrow().mode()
    }

    pub fn snapshot(&self) -> DaemonHealth {
        *self.tx.borrow()
    }

    /// Receiver woken on every mode transition.
    pub fn subscribe(&self) -> watch::Receiver<DaemonHealth> {
        self.tx.subscribe()
    }
}

/// Periodic prober feeding a [`HealthCell`].
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    client: DaemonClient,
    cell: HealthCell,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(client: DaemonClient, cell: HealthCell, interval: Duration) -> Self {
        Self {
            client,
            cell,
            interval,
        }
    }

    /// Run one probe and record it. Returns the probe outcome.
    pub async fn probe_once(&self) -> bool {
        let alive = self.client.probe().await;
        self.cell.record_probe(alive);
        alive
    }

    /// Probe every `interval` until `cancel` fires. The first scheduled probe
    /// is one interval out; the caller runs the startup probe itself.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(daemon = self.client.base_url(), interval = ?self.interval, "health monitor started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = self.probe_once() => {}
                }
            }
            tracing::debug!("health monitor stopped");
        })
    }
}
