//! Remote-proxy-with-local-fallback [`ToolService`].

use super::client::{DaemonClient, DaemonReply};
use super::health::{BridgeMode, DaemonHealth, HealthCell, HealthMonitor};
use crate::facade::{DetailTier, McpToolDefinition};
use crate::kernel::ToolKernel;
use crate::tools::{DispatchContext, ToolResult};
use crate::transport::ToolService;
use crate::types::{BridgeConfig, Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Bridge adapter.
///
/// In proxy mode every call is forwarded to the daemon; a transport failure
/// demotes the adapter and the same call runs on the local kernel. Listing
/// is always answered locally.
#[derive(Debug)]
pub struct BridgeAdapter {
    kernel: Arc<ToolKernel>,
    client: DaemonClient,
    monitor: HealthMonitor,
    health: HealthCell,
    cancel: CancellationToken,
    monitor_task: JoinHandle<()>,
}

impl BridgeAdapter {
    /// Probe the daemon once, then start the periodic monitor.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn start(kernel: Arc<ToolKernel>, config: &BridgeConfig) -> Result<Self> {
        let url = config
            .daemon_url
            .as_deref()
            .ok_or_else(|| Error::configuration("bridge requires bridge.daemon_url"))?;
        let client = DaemonClient::new(url, config)?;
        let health = HealthCell::new();
        let monitor = HealthMonitor::new(client.clone(), health.clone(), config.probe_interval);

        let alive = monitor.probe_once().await;
        tracing::info!(
            daemon = client.base_url(),
            mode = ?health.mode(),
            alive,
            "bridge adapter started"
        );

        let cancel = CancellationToken::new();
        let monitor_task = monitor.clone().spawn(cancel.clone());

        Ok(Self {
            kernel,
            client,
            monitor,
            health,
            cancel,
            monitor_task,
        })
    }

    pub fn mode(&self) -> BridgeMode {
        self.health.mode()
    }

    pub fn health(&self) -> DaemonHealth {
        self.health.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DaemonHealth> {
        self.health.subscribe()
    }

    /// Run one probe cycle now.
    pub async fn probe_now(&self) -> BridgeMode {
        self.monitor.probe_once().await;
        self.mode()
    }

    /// Stop the monitor task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_monitor_running(&self) -> bool {
        !self.monitor_task.is_finished()
    }

    async fn call_remote(&self, name: &str, args: &Value, ctx: &DispatchContext) -> Result<ToolResult> {
        match self.client.call(name, args, ctx).await? {
            DaemonReply::Success(payload) => Ok(ToolResult::success(&payload)),
            DaemonReply::Failure { error, hint, code } => {
                tracing::debug!(tool = name, %error, "daemon reported logical failure");
                Ok(ToolResult::remote_failure(error, hint, code))
            }
        }
    }
}

impl Drop for BridgeAdapter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl ToolService for BridgeAdapter {
    fn list_tools(&self, tier: DetailTier) -> Vec<McpToolDefinition> {
        self.kernel.mcp_tool_definitions(tier)
    }

    async fn call_tool(&self, name: &str, args: Value, ctx: &DispatchContext) -> ToolResult {
        if self.health.is_alive() {
            match self.call_remote(name, &args, ctx).await {
                Ok(result) => return result,
                Err(err) => {
                    tracing::warn!(tool = name, error = %err, "proxy failed, falling back to local dispatch");
                    self.health.demote(&err.to_string());
                }
            }
        }
        self.kernel.dispatch(name, args, ctx).await
    }
}
