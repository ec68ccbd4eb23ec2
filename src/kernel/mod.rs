//! Tool kernel: the single entry point between transports and tools.
//!
//! The kernel owns the registry and the compiled facades. Both are built once
//! at startup and never mutated afterwards, so the kernel is shared as a plain
//! `Arc<ToolKernel>` with no locking:
//! ```text
//!                    ┌──────────────────────────────────┐
//!   tools/list   →   │  facade compiler (tier → defs)   │
//!                    ├──────────────────────────────────┤
//!   tools/call   →   │  resolve: facade.action | legacy │ → handler → envelope
//!                    └──────────────────────────────────┘
//! ```

mod dispatch;

pub use dispatch::Resolved;

use crate::facade::{
    build_mcp_definitions, build_reverse_map, validate_facades, CompiledFacade, DetailTier,
    FacadeSpec, McpToolDefinition, ReverseEntry,
};
use crate::tools::ToolRegistry;
use crate::types::{Error, Result};
use std::collections::HashMap;

/// Registry + compiled facades.
#[derive(Debug)]
pub struct ToolKernel {
    registry: ToolRegistry,
    specs: Vec<FacadeSpec>,
    facades: Vec<CompiledFacade>,
    facade_index: HashMap<String, usize>,
    reverse: HashMap<String, ReverseEntry>,
}

impl ToolKernel {
    /// Validate and compile `facades` against `registry`.
    ///
    /// Any configuration defect (dangling reference, duplicate facade, facade
    /// shadowing a tool, facade without actions) aborts construction.
    pub fn new(registry: ToolRegistry, facades: Vec<FacadeSpec>) -> Result<Self> {
        let dangling = validate_facades(&facades, &registry);
        if !dangling.is_empty() {
            return Err(Error::DanglingReferences(dangling));
        }

        let mut facade_index = HashMap::with_capacity(facades.len());
        let mut compiled = Vec::with_capacity(facades.len());
        for spec in &facades {
            if registry.contains(&spec.name) {
                return Err(Error::configuration(format!(
                    "facade '{}' shadows a registered tool",
                    spec.name
                )));
            }
            if facade_index.insert(spec.name.clone(), compiled.len()).is_some() {
                return Err(Error::DuplicateName(spec.name.clone()));
            }
            compiled.push(CompiledFacade::compile(spec.clone(), &registry)?);
        }

        let reverse = build_reverse_map(&facades);
        tracing::info!(
            tools = registry.len(),
            facades = compiled.len(),
            "tool kernel ready"
        );

        Ok(Self {
            registry,
            specs: facades,
            facades: compiled,
            facade_index,
            reverse,
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn facades(&self) -> &[CompiledFacade] {
        &self.facades
    }

    pub fn facade(&self, name: &str) -> Option<&CompiledFacade> {
        self.facade_index.get(name).map(|&i| &self.facades[i])
    }

    /// Facade entry point for an internal tool, if any.
    pub fn reverse_entry(&self, tool: &str) -> Option<&ReverseEntry> {
        self.reverse.get(tool)
    }

    /// Advertised tool list for `tier`. Pure; safe to call concurrently.
    pub fn mcp_tool_definitions(&self, tier: DetailTier) -> Vec<McpToolDefinition> {
        build_mcp_definitions(&self.specs, tier, Some(&self.registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{handler_fn, ToolDefinition, ToolHandler};
    use serde_json::json;
    use std::sync::Arc;

    fn noop() -> Arc<dyn ToolHandler> {
        Arc::new(handler_fn(|_args, _ctx| async { Ok(json!({})) }))
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for name in ["sentinel_create_issue", "sentinel_list_issues"] {
            registry
                .register(
                    ToolDefinition::new(name, "", json!({"type": "object"})),
                    noop(),
                )
                .unwrap();
        }
        registry
    }

    fn sentinel() -> FacadeSpec {
        FacadeSpec::new("sentinel", "Issues.", "Issues")
            .action("create", "sentinel_create_issue")
            .action("list", "sentinel_list_issues")
    }

    #[test]
    fn test_new_indexes_facades() {
        let kernel = ToolKernel::new(registry(), vec![sentinel()]).unwrap();
        assert_eq!(kernel.facades().len(), 1);
        assert!(kernel.facade("sentinel").is_some());
        assert_eq!(
            kernel.reverse_entry("sentinel_list_issues").unwrap().action,
            "list"
        );
        assert_eq!(kernel.mcp_tool_definitions(DetailTier::Compact).len(), 1);
    }

    #[test]
    fn test_dangling_reference_is_fatal() {
        let facade = sentinel().action("purge", "sentinel_purge");
        let err = ToolKernel::new(registry(), vec![facade]).unwrap_err();
        assert!(matches!(err, Error::DanglingReferences(_)));
    }

    #[test]
    fn test_duplicate_facade_is_fatal() {
        let err = ToolKernel::new(registry(), vec![sentinel(), sentinel()]).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(ref n) if n == "sentinel"));
    }

    #[test]
    fn test_facade_shadowing_tool_is_fatal() {
        let facade = FacadeSpec::new("sentinel_list_issues", "Clash.", "Clash")
            .action("list", "sentinel_list_issues");
        let err = ToolKernel::new(registry(), vec![facade]).unwrap_err();
        assert_eq!(err.error_kind(), "ConfigurationError");
    }
}
