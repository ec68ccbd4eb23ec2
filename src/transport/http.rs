//! HTTP transport.
//!
//! Routes:
//! - `POST /mcp`    JSON-RPC request → JSON-RPC response (202 for notifications)
//! - `GET  /health` liveness (`{"status":"ok"}`)
//! - `POST /call`   daemon contract: `{tool, arguments}` + context headers →
//!   payload on success, `{status:"error", error, code?, hint?}` on failure
//!
//! Serving `/health` and `/call` lets one instance act as the daemon behind
//! another instance's bridge.

use crate::transport::protocol::McpRouter;
use crate::transport::{context_from_headers, ToolService};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
struct AppState {
    router: Arc<McpRouter>,
}

impl AppState {
    fn service(&self) -> &Arc<dyn ToolService> {
        self.router.service()
    }
}

/// Daemon `/call` request body.
#[derive(Debug, Deserialize)]
struct CallRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// HTTP server wrapping a router.
#[derive(Debug)]
pub struct HttpTransport {
    router: Arc<McpRouter>,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl HttpTransport {
    pub fn new(router: McpRouter, addr: SocketAddr) -> Self {
        Self {
            router: Arc::new(router),
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let local = listener.local_addr()?;
        tracing::info!("HTTP transport listening on {}", local);

        let cancel = self.cancel.clone();
        axum::serve(listener, app(Arc::clone(&self.router)))
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("HTTP transport stopped");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Build the axum application for `router`.
pub fn app(router: Arc<McpRouter>) -> Router {
    Router::new()
        .route("/mcp", post(rpc))
        .route("/health", get(health))
        .route("/call", post(call))
        .with_state(AppState { router })
}

async fn rpc(State(state): State<AppState>, body: String) -> Response {
    match state.router.handle_line(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn call(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CallRequest>,
) -> Json<Value> {
    let ctx = context_from_headers(&headers);
    let arguments = match request.arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let result = state.service().call_tool(&request.tool, arguments, &ctx).await;
    let payload = result
        .payload()
        .unwrap_or_else(|| json!({ "text": result.text().unwrap_or_default() }));

    if !result.is_error() {
        return Json(payload);
    }

    let mut body = Map::new();
    body.insert("status".into(), json!("error"));
    body.insert(
        "error".into(),
        payload.get("error").cloned().unwrap_or_else(|| json!("call failed")),
    );
    for key in ["code", "hint"] {
        if let Some(value) = payload.get(key) {
            body.insert(key.into(), value.clone());
        }
    }
    Json(Value::Object(body))
}
