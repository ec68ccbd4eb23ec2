//! Result envelope shared by every handler and every transport.
//!
//! ```text
//! { "content": [ { "type": "text", "text": "<json payload>" } ], "isError": true? }
//! ```
//! `text` is always a serialized JSON object. Failures carry
//! `{ "success": false, "error": ..., "hint"?: ..., "code"?: ... }`.

use crate::types::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One content block. Only text exists in this protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Payload of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePayload {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// The result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    /// Successful call carrying `payload`.
    pub fn success(payload: &Value) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: payload.to_string(),
            }],
            is_error: None,
        }
    }

    /// Failed call with an optional remediation hint.
    pub fn failure(error: impl Into<String>, hint: Option<String>) -> Self {
        Self::from_payload(FailurePayload {
            success: false,
            error: error.into(),
            hint,
            code: None,
        })
    }

    /// Failure built from a kernel error; `error` is prefixed with the taxonomy name.
    pub fn from_error(err: &Error, hint: Option<String>) -> Self {
        Self::failure(format!("{}: {}", err.error_kind(), err), hint)
    }

    /// Logical failure reported by the remote daemon, passed through as-is.
    pub fn remote_failure(
        error: impl Into<String>,
        hint: Option<String>,
        code: Option<String>,
    ) -> Self {
        Self::from_payload(FailurePayload {
            success: false,
            error: error.into(),
            hint,
            code,
        })
    }

    fn from_payload(payload: FailurePayload) -> Self {
        // FailurePayload has only string fields; serialization cannot fail.
        let text = serde_json::to_string(&payload).unwrap_or_else(|_| {
            format!(r#"{{"success":false,"error":{:?}}}"#, payload.error)
        });
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block.
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolContent::Text { text } => text.as_str(),
        })
    }

    /// Parsed JSON payload of the first content block.
    pub fn payload(&self) -> Option<Value> {
        self.text().and_then(|t| serde_json::from_str(t).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let result = ToolResult::success(&json!({"id": "SEN-1"}));
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(
            wire,
            json!({"content": [{"type": "text", "text": "{\"id\":\"SEN-1\"}"}]})
        );
        assert!(!result.is_error());
    }

    #[test]
    fn test_failure_shape() {
        let result = ToolResult::failure("boom", Some("try again".into()));
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["isError"], true);
        assert_eq!(
            result.payload().unwrap(),
            json!({"success": false, "error": "boom", "hint": "try again"})
        );
    }

    #[test]
    fn test_from_error_prefixes_kind() {
        let result = ToolResult::from_error(&Error::unknown_tool("nope"), None);
        let payload = result.payload().unwrap();
        assert_eq!(payload["error"], "UnknownToolError: unknown tool 'nope'");
        assert!(payload.get("hint").is_none());
    }

    #[test]
    fn test_remote_failure_keeps_code() {
        let result = ToolResult::remote_failure("X", None, Some("E_LOCKED".into()));
        assert!(result.is_error());
        assert_eq!(
            result.payload().unwrap(),
            json!({"success": false, "error": "X", "code": "E_LOCKED"})
        );

        let hinted = ToolResult::remote_failure("X", Some("retry later".into()), None);
        assert_eq!(
            hinted.payload().unwrap(),
            json!({"success": false, "error": "X", "hint": "retry later"})
        );
    }

    #[test]
    fn test_envelope_deserializes() {
        let raw = r#"{"content":[{"type":"text","text":"{}"}],"isError":true}"#;
        let result: ToolResult = serde_json::from_str(raw).unwrap();
        assert!(result.is_error());
        assert_eq!(result.text(), Some("{}"));
    }
}
