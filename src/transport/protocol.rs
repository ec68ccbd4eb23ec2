//! JSON-RPC method routing.
//!
//! Protocol: JSON-RPC 2.0. Requests carry an `id` and get exactly one
//! response; notifications (no `id`) get none.

use crate::facade::DetailTier;
use crate::tools::DispatchContext;
use crate::transport::ToolService;
use crate::types::Error;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Routes JSON-RPC messages to a [`ToolService`].
#[derive(Clone)]
pub struct McpRouter {
    service: Arc<dyn ToolService>,
    default_tier: DetailTier,
    server_name: String,
}

impl fmt::Debug for McpRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpRouter")
            .field("default_tier", &self.default_tier)
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

impl McpRouter {
    pub fn new(service: Arc<dyn ToolService>, default_tier: DetailTier) -> Self {
        Self {
            service,
            default_tier,
            server_name: "decibel".to_string(),
        }
    }

    pub fn service(&self) -> &Arc<dyn ToolService> {
        &self.service
    }

    /// Handle one raw message.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => Some(rpc_error(Value::Null, &Error::from(e))),
        }
    }

    /// Handle one decoded message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let Value::Object(request) = message else {
            return Some(error_response(
                Value::Null,
                INVALID_REQUEST,
                "Invalid request: expected a JSON object",
            ));
        };

        let id = request.get("id").cloned();
        let Some(method) = request.get("method").and_then(Value::as_str) else {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "Invalid request: missing method",
            ));
        };

        let Some(id) = id else {
            tracing::debug!(method, "notification");
            return None;
        };

        let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
        let response = match method {
            "initialize" => success_response(id, self.initialize_result()),
            "ping" => success_response(id, json!({})),
            "tools/list" => success_response(id, self.list_tools(&params)),
            "tools/call" => self.call_tool(id, &params).await,
            _ => error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {}", method)),
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    fn list_tools(&self, params: &Value) -> Value {
        let tier = params
            .pointer("/_meta/detailTier")
            .and_then(Value::as_str)
            .and_then(|hint| match hint.parse::<DetailTier>() {
                Ok(tier) => Some(tier),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring detailTier hint");
                    None
                }
            })
            .unwrap_or(self.default_tier);

        let tools = self.service.list_tools(tier);
        tracing::debug!(%tier, count = tools.len(), "tools/list");
        json!({ "tools": tools })
    }

    async fn call_tool(&self, id: Value, params: &Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return rpc_error(id, &Error::validation("tools/call requires params.name"));
        };
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
        let ctx = DispatchContext::from_meta(params.get("_meta"));

        let result = self.service.call_tool(name, args, &ctx).await;
        match serde_json::to_value(&result) {
            Ok(value) => success_response(id, value),
            Err(e) => error_response(id, INTERNAL_ERROR, &format!("Internal error: {}", e)),
        }
    }
}

pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// Error response whose code follows the error's taxonomy.
pub fn rpc_error(id: Value, err: &Error) -> Value {
    error_response(id, err.to_rpc_code(), &err.to_string())
}

pub fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        }
    })
}
