//! Tool infrastructure: registry, handler interface, schemas, result envelope.
//!
//! The kernel owns tool *metadata* and routing; tool business logic lives
//! behind [`ToolHandler`] and is opaque here.

pub mod handler;
pub mod registry;
pub mod result;
pub mod schema;

pub use handler::{handler_fn, DispatchContext, FnHandler, ToolError, ToolHandler};
pub use registry::{RegisteredTool, ToolDefinition, ToolRegistry};
pub use result::{FailurePayload, ToolContent, ToolResult};
pub use schema::{params_from_schema, ParamDef, ParamType};
