//! Transports: translate a wire protocol into [`ToolService`] calls.
//!
//! - [`protocol`]: JSON-RPC method routing shared by every transport
//! - [`stdio`]: newline-delimited JSON-RPC over a byte stream
//! - [`http`]: JSON-RPC over HTTP plus the daemon contract (`/health`, `/call`)
//!
//! The bridge adapter (`crate::bridge`) is itself a [`ToolService`], so any
//! transport can front either the local kernel or the bridge.

pub mod http;
pub mod protocol;
pub mod stdio;

pub use http::HttpTransport;
pub use protocol::McpRouter;
pub use stdio::StdioTransport;

use crate::facade::{DetailTier, McpToolDefinition};
use crate::tools::{DispatchContext, ToolResult};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Context field → HTTP header used when a call crosses to the daemon.
pub const CONTEXT_HEADERS: [(&str, &str); 4] = [
    ("agentId", "x-agent-id"),
    ("runId", "x-run-id"),
    ("parentCallId", "x-parent-call-id"),
    ("scope", "x-scope"),
];

/// Header carrying a context field.
pub fn context_header(field: &str) -> Option<&'static str> {
    CONTEXT_HEADERS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, h)| *h)
}

/// Rebuild a context from request headers.
pub fn context_from_headers(headers: &axum::http::HeaderMap) -> DispatchContext {
    let meta: Map<String, Value> = CONTEXT_HEADERS
        .iter()
        .filter_map(|(field, header)| {
            headers
                .get(*header)
                .and_then(|v| v.to_str().ok())
                .map(|v| (field.to_string(), Value::String(v.to_string())))
        })
        .collect();
    DispatchContext::from_meta(Some(&Value::Object(meta)))
}

/// What a transport needs from the layer below it.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// Advertised tools for `tier`.
    fn list_tools(&self, tier: DetailTier) -> Vec<McpToolDefinition>;

    /// Execute a call. Always yields an envelope.
    async fn call_tool(&self, name: &str, args: Value, ctx: &DispatchContext) -> ToolResult;
}
