//! In-memory issue tracker backing the `sentinel` facade.
//!
//! Demonstration handlers only: issues live in a `RwLock<Vec<Issue>>` and
//! vanish with the process.

use crate::tools::{DispatchContext, ToolDefinition, ToolError, ToolHandler};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const CREATE_ISSUE: &str = "sentinel_create_issue";
pub const LIST_ISSUES: &str = "sentinel_list_issues";
pub const GET_ISSUE: &str = "sentinel_get_issue";
pub const CLOSE_ISSUE: &str = "sentinel_close_issue";

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Open,
    Closed,
    All,
}

impl StatusFilter {
    fn matches(self, status: IssueStatus) -> bool {
        match self {
            StatusFilter::Open => status == IssueStatus::Open,
            StatusFilter::Closed => status == IssueStatus::Closed,
            StatusFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

// =============================================================================
// Tool inputs
// =============================================================================

/// Create an issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueArgs {
    #[schemars(description = "Short summary of the issue")]
    pub title: String,
    #[schemars(description = "Longer description")]
    pub body: Option<String>,
    #[serde(default)]
    #[schemars(description = "Triage priority (default: medium)")]
    pub priority: Priority,
    #[serde(default)]
    #[schemars(description = "Free-form labels")]
    pub labels: Vec<String>,
    #[schemars(description = "Owning project")]
    pub project_id: Option<String>,
}

/// List issues.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListIssuesArgs {
    #[serde(default)]
    #[schemars(description = "Filter by status (default: open)")]
    pub status: StatusFilter,
    #[schemars(description = "Only issues carrying this label")]
    pub label: Option<String>,
    #[schemars(description = "Only issues of this project")]
    pub project_id: Option<String>,
}

/// Fetch one issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetIssueArgs {
    #[schemars(description = "Issue id, e.g. SEN-1")]
    pub id: String,
}

/// Close an issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseIssueArgs {
    #[schemars(description = "Issue id, e.g. SEN-1")]
    pub id: String,
    #[schemars(description = "Why the issue was closed")]
    pub resolution: Option<String>,
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::new(format!("invalid arguments: {}", e)))
}

// =============================================================================
// Store
// =============================================================================

/// Shared issue store.
#[derive(Debug, Default)]
pub struct IssueStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    issues: Vec<Issue>,
    next_seq: u64,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, args: CreateIssueArgs, ctx: &DispatchContext) -> Result<Issue, ToolError> {
        let title = args.title.trim();
        if title.is_empty() {
            return Err(ToolError::new("title must not be empty"));
        }

        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        let issue = Issue {
            id: format!("SEN-{}", inner.next_seq),
            title: title.to_string(),
            body: args.body,
            priority: args.priority,
            labels: args.labels,
            status: IssueStatus::Open,
            project_id: args.project_id.or_else(|| ctx.scope.clone()),
            created_by: ctx.agent_id.clone(),
            created_at: Utc::now(),
            closed_at: None,
            resolution: None,
        };
        inner.issues.push(issue.clone());
        tracing::debug!(id = %issue.id, "issue created");
        Ok(issue)
    }

    pub async fn list(&self, args: ListIssuesArgs) -> Vec<Issue> {
        let inner = self.inner.read().await;
        inner
            .issues
            .iter()
            .filter(|i| args.status.matches(i.status))
            .filter(|i| args.label.as_ref().map_or(true, |l| i.labels.contains(l)))
            .filter(|i| {
                args.project_id
                    .as_ref()
                    .map_or(true, |p| i.project_id.as_ref() == Some(p))
            })
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Issue, ToolError> {
        let inner = self.inner.read().await;
        inner
            .issues
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub async fn close(&self, args: CloseIssueArgs) -> Result<Issue, ToolError> {
        let mut inner = self.inner.write().await;
        let issue = inner
            .issues
            .iter_mut()
            .find(|i| i.id == args.id)
            .ok_or_else(|| not_found(&args.id))?;
        if issue.status == IssueStatus::Closed {
            return Err(ToolError::new(format!("issue '{}' is already closed", args.id))
                .with_hint("closed issues cannot be closed again"));
        }
        issue.status = IssueStatus::Closed;
        issue.closed_at = Some(Utc::now());
        issue.resolution = args.resolution;
        Ok(issue.clone())
    }
}

fn not_found(id: &str) -> ToolError {
    ToolError::new(format!("issue '{}' not found", id))
        .with_hint("call sentinel with action \"list\" to see issue ids")
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Create,
    List,
    Get,
    Close,
}

/// One handler per operation, all sharing the store.
#[derive(Debug)]
struct SentinelTool {
    op: Op,
    store: Arc<IssueStore>,
}

#[async_trait]
impl ToolHandler for SentinelTool {
    async fn call(&self, args: Value, ctx: &DispatchContext) -> Result<Value, ToolError> {
        let issue = match self.op {
            Op::Create => self.store.create(parse(args)?, ctx).await?,
            Op::List => {
                let issues = self.store.list(parse(args)?).await;
                return Ok(json!({ "count": issues.len(), "issues": issues }));
            }
            Op::Get => {
                let args: GetIssueArgs = parse(args)?;
                self.store.get(&args.id).await?
            }
            Op::Close => self.store.close(parse(args)?).await?,
        };
        serde_json::to_value(issue).map_err(|e| ToolError::new(e.to_string()))
    }
}

/// Tool definitions and handlers for the sentinel tracker.
pub fn tools(store: Arc<IssueStore>) -> Vec<(ToolDefinition, Arc<dyn ToolHandler>)> {
    let handler = |op| -> Arc<dyn ToolHandler> {
        Arc::new(SentinelTool {
            op,
            store: Arc::clone(&store),
        })
    };
    vec![
        (
            ToolDefinition::new(
                CREATE_ISSUE,
                "Create an issue. Returns the stored issue with its id.",
                super::input_schema::<CreateIssueArgs>(),
            ),
            handler(Op::Create),
        ),
        (
            ToolDefinition::new(
                LIST_ISSUES,
                "List issues, newest last. Filters combine with AND.",
                super::input_schema::<ListIssuesArgs>(),
            ),
            handler(Op::List),
        ),
        (
            ToolDefinition::new(
                GET_ISSUE,
                "Fetch one issue by id.",
                super::input_schema::<GetIssueArgs>(),
            ),
            handler(Op::Get),
        ),
        (
            ToolDefinition::new(
                CLOSE_ISSUE,
                "Close an open issue.",
                super::input_schema::<CloseIssueArgs>(),
            ),
            handler(Op::Close),
        ),
    ]
}
