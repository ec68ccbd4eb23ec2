//! Built-in tool catalog served by the binary.
//!
//! Facades:
//! - `sentinel`: in-memory issue tracker (create / list / get / close), micro-eligible
//! - `kernel`: diagnostics (status)

pub mod sentinel;

use crate::facade::FacadeSpec;
use crate::kernel::ToolKernel;
use crate::tools::{handler_fn, ToolDefinition, ToolRegistry};
use crate::types::Result;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

pub const KERNEL_STATUS: &str = "kernel_status";

/// JSON Schema for `T` with every subschema inlined (no `$ref`), so the
/// top-level properties carry their own types and enums.
pub fn input_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<T>();
    serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }))
}

/// Facade layout of the built-in catalog.
pub fn facades() -> Vec<FacadeSpec> {
    vec![
        FacadeSpec::new(
            "sentinel",
            "Track work items as issues. Issues are scoped to a project and carry a priority and labels.",
            "Issue tracker",
        )
        .action("create", sentinel::CREATE_ISSUE)
        .action("list", sentinel::LIST_ISSUES)
        .action("get", sentinel::GET_ISSUE)
        .action("close", sentinel::CLOSE_ISSUE)
        .micro(true),
        FacadeSpec::new(
            "kernel",
            "Inspect the running tool kernel. Read-only.",
            "Kernel diagnostics",
        )
        .action("status", KERNEL_STATUS),
    ]
}

/// `kernel_status` takes no arguments.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusArgs {}

/// Registry holding every built-in tool.
pub fn registry() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    let store = Arc::new(sentinel::IssueStore::new());
    for (definition, handler) in sentinel::tools(store) {
        registry.register(definition, handler)?;
    }

    let facade_names: Vec<String> = facades().into_iter().map(|f| f.name).collect();
    let mut tool_names: Vec<String> = registry.names().to_vec();
    tool_names.push(KERNEL_STATUS.to_string());
    let started = Instant::now();

    registry.register(
        ToolDefinition::new(
            KERNEL_STATUS,
            "Report kernel version, uptime and catalog contents.",
            input_schema::<StatusArgs>(),
        ),
        Arc::new(handler_fn(move |_args, _ctx| {
            let status = json!({
                "version": env!("CARGO_PKG_VERSION"),
                "uptimeSecs": started.elapsed().as_secs(),
                "facades": facade_names,
                "tools": tool_names,
            });
            async move { Ok(status) }
        })),
    )?;
    Ok(registry)
}

/// Kernel over the built-in catalog.
pub fn builtin() -> Result<ToolKernel> {
    ToolKernel::new(registry()?, facades())
}
