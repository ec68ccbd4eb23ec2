//! Kernel integration tests: facade resolution through the built-in catalog.

use decibel_mcp::catalog;
use decibel_mcp::facade::DetailTier;
use decibel_mcp::tools::DispatchContext;
use pretty_assertions::assert_eq;
use serde_json::json;

fn ctx() -> DispatchContext {
    DispatchContext {
        agent_id: Some("agent-1".into()),
        run_id: Some("run-42".into()),
        scope: Some("proj-a".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sentinel_create_list_close() {
    let kernel = catalog::builtin().unwrap();

    let created = kernel
        .dispatch(
            "sentinel",
            json!({"action": "create", "title": "bug", "priority": "high"}),
            &ctx(),
        )
        .await;
    assert!(!created.is_error());
    let issue = created.payload().unwrap();
    assert_eq!(issue["id"], "SEN-1");
    assert_eq!(issue["title"], "bug");
    assert_eq!(issue["createdBy"], "agent-1");
    assert_eq!(issue["projectId"], "proj-a");
    assert!(issue.get("action").is_none());

    let listed = kernel
        .dispatch("sentinel", json!({"action": "list"}), &ctx())
        .await
        .payload()
        .unwrap();
    assert_eq!(listed["count"], 1);

    let closed = kernel
        .dispatch("sentinel", json!({"action": "close", "id": "SEN-1"}), &ctx())
        .await
        .payload()
        .unwrap();
    assert_eq!(closed["status"], "closed");
}

#[tokio::test]
async fn test_unknown_action_envelope() {
    let kernel = catalog::builtin().unwrap();
    let result = kernel
        .dispatch("sentinel", json!({"action": "delete"}), &ctx())
        .await;

    assert!(result.is_error());
    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["isError"], true);
    let payload = result.payload().unwrap();
    assert_eq!(payload["success"], false);
    assert_eq!(
        payload["error"],
        "UnknownActionError: unknown action 'delete' for 'sentinel' (expected one of: create, list, get, close)"
    );
}

#[tokio::test]
async fn test_schema_rejection_carries_signature_hint() {
    let kernel = catalog::builtin().unwrap();
    let result = kernel
        .dispatch("sentinel", json!({"action": "create", "priority": "urgent"}), &ctx())
        .await;
    let payload = result.payload().unwrap();
    assert!(payload["error"]
        .as_str()
        .unwrap()
        .starts_with("InvalidArgumentsError"));
    assert_eq!(
        payload["hint"],
        "create(title, body?, priority?: low|medium|high, labels[]?)"
    );
}

#[tokio::test]
async fn test_handler_failure_surfaces_hint() {
    let kernel = catalog::builtin().unwrap();
    let result = kernel
        .dispatch("sentinel", json!({"action": "get", "id": "SEN-404"}), &ctx())
        .await;
    assert_eq!(
        result.payload().unwrap(),
        json!({
            "success": false,
            "error": "issue 'SEN-404' not found",
            "hint": "call sentinel with action \"list\" to see issue ids"
        })
    );
}

#[tokio::test]
async fn test_legacy_direct_call_reaches_same_handler() {
    let kernel = catalog::builtin().unwrap();
    kernel
        .dispatch("sentinel_create_issue", json!({"title": "direct"}), &ctx())
        .await;
    let fetched = kernel
        .dispatch("sentinel", json!({"action": "get", "id": "SEN-1"}), &ctx())
        .await
        .payload()
        .unwrap();
    assert_eq!(fetched["title"], "direct");
}

#[test]
fn test_catalog_tiers() {
    let kernel = catalog::builtin().unwrap();

    let full = kernel.mcp_tool_definitions(DetailTier::Full);
    let compact = kernel.mcp_tool_definitions(DetailTier::Compact);
    let micro = kernel.mcp_tool_definitions(DetailTier::Micro);

    let names = |defs: &[decibel_mcp::facade::McpToolDefinition]| {
        defs.iter().map(|d| d.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&full), vec!["sentinel", "kernel"]);
    assert_eq!(names(&compact), vec!["sentinel", "kernel"]);
    assert_eq!(names(&micro), vec!["sentinel"]);

    assert_eq!(compact[0].description, "Issue tracker");
    assert_eq!(
        full[0].input_schema["properties"]["action"]["enum"],
        json!(["create", "list", "get", "close"])
    );
    assert_eq!(full, kernel.mcp_tool_definitions(DetailTier::Full));
}

#[tokio::test]
async fn test_concurrent_dispatch_assigns_unique_ids() {
    let kernel = std::sync::Arc::new(catalog::builtin().unwrap());
    let mut handles = Vec::new();
    for i in 0..16 {
        let kernel = kernel.clone();
        handles.push(tokio::spawn(async move {
            kernel
                .dispatch(
                    "sentinel",
                    json!({"action": "create", "title": format!("issue {}", i)}),
                    &DispatchContext::default(),
                )
                .await
                .payload()
                .unwrap()["id"]
                .as_str()
                .unwrap()
                .to_string()
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
}
