//! Facades: externally advertised tools multiplexing internal tools behind
//! an `action` parameter, and the compiler producing their catalog tiers.

pub mod compiled;
pub mod compiler;
pub mod spec;

pub use compiled::{CompiledAction, CompiledFacade};
pub use compiler::{
    build_action_signature, build_mcp_definitions, build_reverse_map,
    build_signature_description, validate_facades, McpToolDefinition, ReverseEntry, ToolLookup,
};
pub use spec::{DetailTier, FacadeSpec};
