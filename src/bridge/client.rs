//! HTTP client for the coordinating daemon.
//!
//! Two endpoints: `GET /health` (2xx = alive) and `POST /call`. Every request
//! carries its own timeout; a dropped future releases the connection.

use crate::tools::DispatchContext;
use crate::transport::context_header;
use crate::types::{BridgeConfig, Error, Result};
use serde_json::{json, Value};
use std::time::Duration;

/// Parsed `/call` response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonReply {
    /// Any well-formed body without `status:"error"`; becomes the payload.
    Success(Value),
    /// `status:"error"` with optional `error` / `hint` / `code`.
    Failure {
        error: String,
        hint: Option<String>,
        code: Option<String>,
    },
}

impl DaemonReply {
    /// Classify a decoded body.
    pub fn from_body(body: Value) -> Self {
        if body.get("status").and_then(Value::as_str) != Some("error") {
            return DaemonReply::Success(body);
        }
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("remote call failed")
            .to_string();
        let text = |key: &str| {
            body.get(key).map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };
        DaemonReply::Failure {
            error,
            hint: text("hint"),
            code: text("code"),
        }
    }
}

/// Thin reqwest wrapper bound to one daemon.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
    call_timeout: Duration,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>, config: &BridgeConfig) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::configuration("bridge daemon_url is empty"));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            probe_timeout: config.probe_timeout,
            call_timeout: config.call_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health` within the probe timeout.
    pub async fn probe(&self) -> bool {
        let request = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(self.probe_timeout)
            .send();
        match request.await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    tracing::debug!(status = %resp.status(), "daemon probe: non-success status");
                }
                ok
            }
            Err(e) => {
                tracing::debug!(error = %e, "daemon probe failed");
                false
            }
        }
    }

    /// `POST /call`. Any failure to obtain a well-formed JSON body is a
    /// transport error.
    pub async fn call(&self, tool: &str, args: &Value, ctx: &DispatchContext) -> Result<DaemonReply> {
        let mut request = self
            .http
            .post(format!("{}/call", self.base_url))
            .timeout(self.call_timeout)
            .json(&json!({ "tool": tool, "arguments": args }));
        for (field, value) in ctx.fields() {
            if let Some(header) = context_header(field) {
                request = request.header(header, value);
            }
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("POST /call: {}", e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::transport(format!("POST /call: status {}", status)));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| Error::transport(format!("POST /call: unreadable body: {}", e)))?;
        Ok(DaemonReply::from_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reply_classification() {
        assert_eq!(
            DaemonReply::from_body(json!({"id": "SEN-1"})),
            DaemonReply::Success(json!({"id": "SEN-1"}))
        );
        assert_eq!(
            DaemonReply::from_body(json!({"status": "ok", "n": 1})),
            DaemonReply::Success(json!({"status": "ok", "n": 1}))
        );
        assert_eq!(
            DaemonReply::from_body(json!({"status": "error", "error": "X", "code": "E_LOCKED"})),
            DaemonReply::Failure {
                error: "X".into(),
                hint: None,
                code: Some("E_LOCKED".into())
            }
        );
        assert_eq!(
            DaemonReply::from_body(json!({"status": "error", "code": 409})),
            DaemonReply::Failure {
                error: "remote call failed".into(),
                hint: None,
                code: Some("409".into())
            }
        );
        assert_eq!(
            DaemonReply::from_body(json!({"status": "error", "error": "locked", "hint": "unlock it"})),
            DaemonReply::Failure {
                error: "locked".into(),
                hint: Some("unlock it".into()),
                code: None
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = DaemonClient::new("http://127.0.0.1:9/", &BridgeConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        assert!(DaemonClient::new("", &BridgeConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_daemon() {
        let config = BridgeConfig {
            probe_timeout: Duration::from_millis(200),
            call_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        // Port 9 (discard) is closed on test hosts.
        let client = DaemonClient::new("http://127.0.0.1:9", &config).unwrap();
        assert!(!client.probe().await);
        let err = client
            .call("sentinel", &json!({}), &DispatchContext::default())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
