//! Tool registry: internal tool name → {definition, handler}.
//!
//! Append-only and built once at startup. Every entry keeps its compiled
//! input-schema validator and the typed parameter list used for signatures.

use crate::tools::handler::ToolHandler;
use crate::tools::schema::{params_from_schema, ParamDef};
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Public description of an internal tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A registered tool.
pub struct RegisteredTool {
    definition: ToolDefinition,
    params: Vec<ParamDef>,
    validator: jsonschema::Validator,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Top-level input parameters in declared order.
    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }

    /// Check `args` against the input schema. Returns every problem found.
    pub fn check_args(&self, args: &Value) -> Vec<String> {
        self.validator
            .iter_errors(args)
            .map(|e| e.to_string())
            .collect()
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// In-memory tool registry.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: HashMap<String, RegisteredTool>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// Fails on an empty or duplicate name and on an input schema that does
    /// not compile.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        if definition.name.is_empty() {
            return Err(Error::configuration("Tool name cannot be empty"));
        }
        if self.entries.contains_key(&definition.name) {
            return Err(Error::DuplicateName(definition.name));
        }

        let validator = jsonschema::validator_for(&definition.input_schema).map_err(|e| {
            Error::configuration(format!(
                "tool '{}' has an invalid input schema: {}",
                definition.name, e
            ))
        })?;
        let params = params_from_schema(&definition.input_schema);

        tracing::debug!(tool = %definition.name, params = params.len(), "registered tool");
        self.order.push(definition.name.clone());
        self.entries.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                params,
                validator,
                handler,
            },
        );
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
