//! Call resolution and handler invocation.

use super::ToolKernel;
use crate::facade::{DetailTier, McpToolDefinition};
use crate::tools::{DispatchContext, RegisteredTool, ToolResult};
use crate::transport::ToolService;
use crate::types::{Error, Result};
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::Instrument;

/// A call bound to its internal tool.
#[derive(Debug)]
pub struct Resolved<'k> {
    pub tool: &'k RegisteredTool,
    /// Arguments for the handler (facade `action` removed).
    pub args: Value,
    /// `(facade, action)` when resolved through a facade.
    pub via: Option<(&'k str, &'k str)>,
    /// Action signature used as a hint when arguments are rejected.
    pub signature: Option<&'k str>,
}

impl ToolKernel {
    /// Resolve `name` + `args` to an internal tool.
    ///
    /// Order: facade + `action`, then a direct (legacy) tool name, then
    /// `UnknownToolError`.
    pub fn resolve(&self, name: &str, args: Value) -> Result<Resolved<'_>> {
        let mut args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Some(facade) = self.facade(name) {
            let action = match args.remove("action") {
                Some(Value::String(action)) => action,
                Some(other) => return Err(facade.unknown_action(&other.to_string())),
                None => return Err(facade.unknown_action("")),
            };
            let bound = facade.resolve(&action)?;
            let tool = self
                .registry()
                .get(&bound.tool)
                .ok_or_else(|| Error::unknown_tool(bound.tool.as_str()))?;
            return Ok(Resolved {
                tool,
                args: Value::Object(args),
                via: Some((facade.name(), bound.name.as_str())),
                signature: Some(bound.signature.as_str()),
            });
        }

        if let Some(tool) = self.registry().get(name) {
            if let Some(entry) = self.reverse_entry(name) {
                tracing::debug!(
                    tool = name,
                    facade = %entry.facade,
                    action = %entry.action,
                    "legacy direct call"
                );
            }
            return Ok(Resolved {
                tool,
                args: Value::Object(args),
                via: None,
                signature: None,
            });
        }

        Err(Error::unknown_tool(name))
    }

    /// Dispatch a call and always produce an envelope.
    ///
    /// Resolution failures, rejected arguments, handler errors and handler
    /// panics all come back as `isError` envelopes.
    pub async fn dispatch(&self, name: &str, args: Value, ctx: &DispatchContext) -> ToolResult {
        let call_id = uuid::Uuid::new_v4();
        let span = tracing::debug_span!(
            "dispatch",
            %call_id,
            tool = name,
            agent_id = ctx.agent_id.as_deref(),
            run_id = ctx.run_id.as_deref(),
            parent_call_id = ctx.parent_call_id.as_deref(),
            scope = ctx.scope.as_deref(),
        );

        async move {
            let resolved = match self.resolve(name, args) {
                Ok(resolved) => resolved,
                Err(err) => {
                    tracing::debug!(error = %err, "call did not resolve");
                    let hint = resolution_hint(&err);
                    return ToolResult::from_error(&err, hint);
                }
            };

            let problems = resolved.tool.check_args(&resolved.args);
            if !problems.is_empty() {
                let err = Error::InvalidArguments {
                    tool: resolved.tool.name().to_string(),
                    problems,
                };
                tracing::debug!(error = %err, "arguments rejected");
                return ToolResult::from_error(&err, resolved.signature.map(str::to_string));
            }

            invoke(resolved.tool, resolved.args, ctx).await
        }
        .instrument(span)
        .await
    }
}

async fn invoke(tool: &RegisteredTool, args: Value, ctx: &DispatchContext) -> ToolResult {
    let started = Instant::now();
    let handler = tool.handler();
    let outcome = AssertUnwindSafe(handler.call(args, ctx))
        .catch_unwind()
        .await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(payload)) => {
            tracing::debug!(tool = tool.name(), latency_ms, "handler succeeded");
            ToolResult::success(&payload)
        }
        Ok(Err(err)) => {
            tracing::debug!(tool = tool.name(), latency_ms, error = %err, "handler failed");
            ToolResult::failure(err.message, err.hint)
        }
        Err(panic) => {
            let err = Error::handler(tool.name(), panic_message(panic.as_ref()));
            tracing::error!(tool = tool.name(), error = %err, "handler panicked");
            ToolResult::from_error(&err, None)
        }
    }
}

fn resolution_hint(err: &Error) -> Option<String> {
    match err {
        Error::UnknownAction { valid, .. } => {
            Some(format!("pass \"action\" as one of: {}", valid.join(", ")))
        }
        Error::UnknownTool(_) => Some("call tools/list for the available tools".to_string()),
        _ => None,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[async_trait]
impl ToolService for ToolKernel {
    fn list_tools(&self, tier: DetailTier) -> Vec<McpToolDefinition> {
        self.mcp_tool_definitions(tier)
    }

    async fn call_tool(&self, name: &str, args: Value, ctx: &DispatchContext) -> ToolResult {
        self.dispatch(name, args, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::FacadeSpec;
    use crate::tools::{handler_fn, ToolDefinition, ToolError, ToolHandler, ToolRegistry};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing_test::traced_test;

    type Calls = Arc<Mutex<Vec<(String, Value, DispatchContext)>>>;

    fn recording(name: &'static str, calls: Calls) -> Arc<dyn ToolHandler> {
        Arc::new(handler_fn(move |args: Value, ctx: DispatchContext| {
            let calls = calls.clone();
            async move {
                calls
                    .lock()
                    .unwrap()
                    .push((name.to_string(), args.clone(), ctx));
                Ok(json!({"tool": name, "args": args}))
            }
        }))
    }

    fn kernel_with(calls: Calls) -> ToolKernel {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "sentinel_create_issue",
                    "Create an issue",
                    json!({
                        "type": "object",
                        "properties": {"title": {"type": "string"}},
                        "required": ["title"],
                    }),
                ),
                recording("sentinel_create_issue", calls.clone()),
            )
            .unwrap();
        registry
            .register(
                ToolDefinition::new("sentinel_list_issues", "List", json!({"type": "object"})),
                recording("sentinel_list_issues", calls),
            )
            .unwrap();
        registry
            .register(
                ToolDefinition::new("explode", "Panics", json!({"type": "object"})),
                Arc::new(handler_fn(|_args, _ctx| async {
                    if true {
                        panic!("kaboom");
                    }
                    Ok(Value::Null)
                })),
            )
            .unwrap();
        registry
            .register(
                ToolDefinition::new("refuse", "Fails", json!({"type": "object"})),
                Arc::new(handler_fn(|_args, _ctx| async {
                    Err(ToolError::new("issue is locked").with_hint("unlock it first"))
                })),
            )
            .unwrap();

        let sentinel = FacadeSpec::new("sentinel", "Issues.", "Issues")
            .action("create", "sentinel_create_issue")
            .action("list", "sentinel_list_issues");
        ToolKernel::new(registry, vec![sentinel]).unwrap()
    }

    #[tokio::test]
    async fn test_facade_call_strips_action_and_passes_context() {
        let calls: Calls = Arc::default();
        let kernel = kernel_with(calls.clone());
        let ctx = DispatchContext {
            agent_id: Some("agent-7".into()),
            run_id: Some("run-1".into()),
            ..Default::default()
        };

        let result = kernel
            .dispatch("sentinel", json!({"action": "create", "title": "bug"}), &ctx)
            .await;

        assert!(!result.is_error());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sentinel_create_issue");
        assert_eq!(calls[0].1, json!({"title": "bug"}));
        assert_eq!(calls[0].2, ctx);
    }

    #[tokio::test]
    async fn test_unknown_action_is_error_envelope() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("sentinel", json!({"action": "delete"}), &DispatchContext::default())
            .await;

        assert!(result.is_error());
        let payload = result.payload().unwrap();
        assert_eq!(payload["success"], false);
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("UnknownActionError"));
        assert_eq!(payload["hint"], "pass \"action\" as one of: create, list");
    }

    #[tokio::test]
    async fn test_missing_action_is_unknown_action() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("sentinel", json!({"title": "x"}), &DispatchContext::default())
            .await;
        let payload = result.payload().unwrap();
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("UnknownActionError"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_envelope() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("nope", json!({}), &DispatchContext::default())
            .await;
        assert!(result.is_error());
        assert_eq!(
            result.payload().unwrap()["error"],
            "UnknownToolError: unknown tool 'nope'"
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn test_legacy_direct_call() {
        let calls: Calls = Arc::default();
        let kernel = kernel_with(calls.clone());
        let result = kernel
            .dispatch(
                "sentinel_list_issues",
                json!({"status": "open"}),
                &DispatchContext::default(),
            )
            .await;

        assert!(!result.is_error());
        assert_eq!(calls.lock().unwrap()[0].1, json!({"status": "open"}));
        assert!(logs_contain("legacy direct call"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_dispatch_span_carries_context_ids() {
        let kernel = kernel_with(Arc::default());
        let ctx = DispatchContext {
            agent_id: Some("agent-span".into()),
            run_id: Some("run-span".into()),
            parent_call_id: Some("parent-span".into()),
            scope: Some("scope-span".into()),
        };
        kernel
            .dispatch("sentinel", json!({"action": "delete"}), &ctx)
            .await;

        assert!(logs_contain("call did not resolve"));
        for id in ["agent-span", "run-span", "parent-span", "scope-span"] {
            assert!(logs_contain(id), "span is missing {}", id);
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_hint_signature() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("sentinel", json!({"action": "create"}), &DispatchContext::default())
            .await;
        let payload = result.payload().unwrap();
        assert!(payload["error"]
            .as_str()
            .unwrap()
            .starts_with("InvalidArgumentsError"));
        assert_eq!(payload["hint"], "create(title)");
    }

    #[tokio::test]
    async fn test_handler_error_keeps_hint() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("refuse", json!({}), &DispatchContext::default())
            .await;
        assert_eq!(
            result.payload().unwrap(),
            json!({"success": false, "error": "issue is locked", "hint": "unlock it first"})
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let kernel = kernel_with(Arc::default());
        let result = kernel
            .dispatch("explode", json!({}), &DispatchContext::default())
            .await;
        assert!(result.is_error());
        let error = result.payload().unwrap()["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("HandlerError"));
        assert!(error.contains("kaboom"));
    }

    #[tokio::test]
    async fn test_non_object_args_treated_as_empty() {
        let calls: Calls = Arc::default();
        let kernel = kernel_with(calls.clone());
        let result = kernel
            .dispatch("sentinel_list_issues", Value::Null, &DispatchContext::default())
            .await;
        assert!(!result.is_error());
        assert_eq!(calls.lock().unwrap()[0].1, json!({}));
    }
}
