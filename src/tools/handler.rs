//! Handler interface and dispatch context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Caller-supplied correlation identifiers threaded through a call.
///
/// Opaque to the kernel: forwarded to handlers and, under proxying,
/// re-encoded as request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl DispatchContext {
    /// Extract the context from a request `_meta` object. Non-string values are ignored.
    pub fn from_meta(meta: Option<&Value>) -> Self {
        let field = |key: &str| {
            meta.and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            agent_id: field("agentId"),
            run_id: field("runId"),
            parent_call_id: field("parentCallId"),
            scope: field("scope"),
        }
    }

    /// Present fields as `(field, value)` pairs, in a fixed order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("agentId", self.agent_id.as_deref()),
            ("runId", self.run_id.as_deref()),
            ("parentCallId", self.parent_call_id.as_deref()),
            ("scope", self.scope.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

/// Failure reported by a tool handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
    /// Remediation surfaced to the caller.
    pub hint: Option<String>,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// An internal tool implementation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool. `args` never contains the facade `action` discriminator.
    async fn call(&self, args: Value, ctx: &DispatchContext) -> Result<Value, ToolError>;
}

/// Adapter turning an async closure into a [`ToolHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

/// Wrap `f` as a handler.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Value, DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Value, DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send,
{
    async fn call(&self, args: Value, ctx: &DispatchContext) -> Result<Value, ToolError> {
        (self.f)(args, ctx.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_from_meta() {
        let meta = json!({"agentId": "a-1", "scope": "proj", "runId": 7, "other": "x"});
        let ctx = DispatchContext::from_meta(Some(&meta));
        assert_eq!(ctx.agent_id.as_deref(), Some("a-1"));
        assert_eq!(ctx.scope.as_deref(), Some("proj"));
        assert!(ctx.run_id.is_none());
        assert!(ctx.parent_call_id.is_none());

        let fields: Vec<_> = ctx.fields().collect();
        assert_eq!(fields, vec![("agentId", "a-1"), ("scope", "proj")]);
    }

    #[test]
    fn test_empty_context() {
        assert!(DispatchContext::from_meta(None).is_empty());
    }

    #[tokio::test]
    async fn test_handler_fn_receives_context() {
        let handler = handler_fn(|args: Value, ctx: DispatchContext| async move {
            Ok(json!({"args": args, "agent": ctx.agent_id}))
        });
        let ctx = DispatchContext {
            agent_id: Some("a-9".into()),
            ..Default::default()
        };
        let out = handler.call(json!({"x": 1}), &ctx).await.unwrap();
        assert_eq!(out, json!({"args": {"x": 1}, "agent": "a-9"}));
    }
}
